//! Appointment endpoints: book, list, slots, cancel, reschedule,
//! complete. Wire field names are uniformly `snake_case`.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::booking;
use crate::db::repository::list_appointments_for_user;
use crate::models::Appointment;
use crate::validation::{time_slots, AppointmentForm};

use super::UserQuery;

#[derive(Deserialize)]
pub struct BookBody {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub form: AppointmentForm,
}

#[derive(Serialize)]
pub struct BookResponse {
    pub appointment_id: Uuid,
    pub status: &'static str,
}

/// `POST /api/appointments` — book a new appointment.
pub async fn book(
    State(ctx): State<ApiContext>,
    Json(body): Json<BookBody>,
) -> Result<Json<BookResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let today = Local::now().date_naive();

    let appointment_id = booking::create(&conn, body.user_id, &body.form, today)?;

    Ok(Json(BookResponse {
        appointment_id,
        status: "pending",
    }))
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/appointments?user_id=` — list a parishioner's bookings.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<UserQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let appointments = list_appointments_for_user(&conn, &query.user_id)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub slots: Vec<String>,
}

/// `GET /api/appointments/slots` — the bookable half-hour grid for the
/// booking form's slot picker.
pub async fn slots() -> Json<SlotsResponse> {
    Json(SlotsResponse {
        slots: time_slots()
            .into_iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect(),
    })
}

#[derive(Deserialize)]
pub struct CancelBody {
    pub reason: String,
}

#[derive(Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// `POST /api/appointments/:id/cancel`
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<CancelBody>,
) -> Result<Json<AckResponse>, ApiError> {
    let conn = ctx.open_db()?;
    booking::cancel(&conn, &id, &body.reason)?;
    Ok(Json(AckResponse { ok: true }))
}

#[derive(Deserialize)]
pub struct RescheduleBody {
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
}

/// `POST /api/appointments/:id/reschedule`
pub async fn reschedule(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<RescheduleBody>,
) -> Result<Json<AckResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let today = Local::now().date_naive();
    booking::reschedule(&conn, &id, body.date, &body.time, &body.reason, today)?;
    Ok(Json(AckResponse { ok: true }))
}

/// `POST /api/appointments/:id/complete` — staff action.
pub async fn complete(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AckResponse>, ApiError> {
    let conn = ctx.open_db()?;
    booking::complete(&conn, &id)?;
    Ok(Json(AckResponse { ok: true }))
}
