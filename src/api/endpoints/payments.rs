//! Payment tracking endpoints. The parish office records dues and
//! settles them at the desk; the online checkout is an explicit 501
//! until a gateway exists.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{insert_payment, list_payments_for_user, mark_paid};
use crate::models::{NotificationKind, Payment, PaymentStatus};
use crate::notify::notify;

use super::UserQuery;

#[derive(Serialize)]
pub struct PaymentsResponse {
    pub payments: Vec<Payment>,
}

/// `GET /api/payments?user_id=`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<UserQuery>,
) -> Result<Json<PaymentsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let payments = list_payments_for_user(&conn, &query.user_id)?;
    Ok(Json(PaymentsResponse { payments }))
}

#[derive(Deserialize)]
pub struct RecordBody {
    pub user_id: Uuid,
    pub reference_id: Option<Uuid>,
    pub description: String,
    pub amount_cents: i64,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub payment_id: Uuid,
}

/// `POST /api/payments` — staff records a due payment.
pub async fn record(
    State(ctx): State<ApiContext>,
    Json(body): Json<RecordBody>,
) -> Result<Json<RecordResponse>, ApiError> {
    if body.description.trim().is_empty() {
        return Err(ApiError::BadRequest("description is required".into()));
    }
    if body.amount_cents <= 0 {
        return Err(ApiError::BadRequest("amount must be positive".into()));
    }

    let conn = ctx.open_db()?;
    let payment = Payment {
        id: Uuid::new_v4(),
        user_id: body.user_id,
        reference_id: body.reference_id,
        description: body.description.clone(),
        amount_cents: body.amount_cents,
        status: PaymentStatus::Pending,
        created_at: Local::now().naive_local(),
        paid_at: None,
    };
    insert_payment(&conn, &payment)?;

    notify(
        &conn,
        body.user_id,
        NotificationKind::PaymentRecorded,
        format!("A payment of {} centavos is due: {}", body.amount_cents, body.description),
    );

    Ok(Json(RecordResponse { payment_id: payment.id }))
}

#[derive(Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// `POST /api/payments/:id/settle` — staff marks a due payment paid at
/// the parish desk. Conditional: only a pending payment settles.
pub async fn settle(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AckResponse>, ApiError> {
    let conn = ctx.open_db()?;
    if !mark_paid(&conn, &id, Local::now().naive_local())? {
        // Either unknown or no longer pending
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM payments WHERE id = ?1",
                rusqlite::params![id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n > 0)
            .map_err(crate::db::DatabaseError::from)?;
        return Err(if exists {
            ApiError::AlreadyTerminal
        } else {
            ApiError::NotFound("Payment not found".into())
        });
    }
    Ok(Json(AckResponse { ok: true }))
}

/// `POST /api/payments/:id/checkout` — online payment is not wired to a
/// gateway; respond with an explicit 501 instead of a silent no-op.
pub async fn checkout(Path(_id): Path<Uuid>) -> ApiError {
    ApiError::NotImplemented("Online payment")
}
