use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PaymentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Appointment or document request this payment settles, when any.
    pub reference_id: Option<Uuid>,
    pub description: String,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub created_at: NaiveDateTime,
    pub paid_at: Option<NaiveDateTime>,
}
