//! Notification endpoints: per-user listing and mark-read.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{list_notifications_for_user, mark_notification_read};
use crate::models::Notification;

use super::UserQuery;

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
    pub unread: usize,
}

/// `GET /api/notifications?user_id=`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<UserQuery>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let notifications = list_notifications_for_user(&conn, &query.user_id)?;
    let unread = notifications.iter().filter(|n| !n.is_read).count();
    Ok(Json(NotificationsResponse { notifications, unread }))
}

#[derive(Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// `POST /api/notifications/:id/read`
pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AckResponse>, ApiError> {
    let conn = ctx.open_db()?;
    mark_notification_read(&conn, &id)?;
    Ok(Json(AckResponse { ok: true }))
}
