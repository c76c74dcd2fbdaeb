use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AppointmentStatus, BookingType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub booking_type: BookingType,
    pub date: NaiveDate,
    pub time_slot: NaiveTime,
    pub purpose: String,
    pub status: AppointmentStatus,
    pub cancel_reason: Option<String>,
    pub reschedule_history: Vec<RescheduleEntry>,
}

/// One appended entry per reschedule, persisted as JSON in the
/// appointments row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleEntry {
    pub old_date: NaiveDate,
    pub old_time: NaiveTime,
    pub reason: String,
    pub moved_on: NaiveDate,
}
