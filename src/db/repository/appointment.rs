use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus, BookingType, RescheduleEntry};

/// Statuses from which cancel/reschedule may still proceed.
/// `rescheduled` rows written by staff tooling count as open bookings.
const OPEN_STATUSES: &str = "('pending', 'rescheduled')";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, user_id, booking_type, date, time_slot, purpose,
         status, cancel_reason, reschedule_history)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appt.id.to_string(),
            appt.user_id.to_string(),
            appt.booking_type.as_str(),
            appt.date.to_string(),
            appt.time_slot.format("%H:%M").to_string(),
            appt.purpose,
            appt.status.as_str(),
            appt.cancel_reason,
            history_json(&appt.reschedule_history)?,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, booking_type, date, time_slot, purpose,
         status, cancel_reason, reschedule_history
         FROM appointments WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], map_row);

    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_appointments_for_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, booking_type, date, time_slot, purpose,
         status, cancel_reason, reschedule_history
         FROM appointments WHERE user_id = ?1
         ORDER BY date DESC, time_slot DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], map_row)?;

    let mut appts = Vec::new();
    for row in rows {
        appts.push(appointment_from_row(row?)?);
    }
    Ok(appts)
}

// ─── Conditional transitions ──────────────────────────────────────────────────
//
// The terminal-state check and the write happen in one UPDATE; `false`
// means the row was not in an accepted source status (or does not exist —
// the caller distinguishes via `get_appointment`).

pub fn mark_cancelled(
    conn: &Connection,
    id: &Uuid,
    reason: &str,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        &format!(
            "UPDATE appointments SET status = 'cancelled', cancel_reason = ?2
             WHERE id = ?1 AND status IN {OPEN_STATUSES}"
        ),
        params![id.to_string(), reason],
    )?;
    Ok(changed > 0)
}

pub fn apply_reschedule(
    conn: &Connection,
    id: &Uuid,
    new_date: NaiveDate,
    new_time: NaiveTime,
    history: &[RescheduleEntry],
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        &format!(
            "UPDATE appointments SET date = ?2, time_slot = ?3,
             reschedule_history = ?4, status = 'pending'
             WHERE id = ?1 AND status IN {OPEN_STATUSES}"
        ),
        params![
            id.to_string(),
            new_date.to_string(),
            new_time.format("%H:%M").to_string(),
            history_json(history)?,
        ],
    )?;
    Ok(changed > 0)
}

pub fn mark_completed(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = 'completed'
         WHERE id = ?1 AND status = 'pending'",
        params![id.to_string()],
    )?;
    Ok(changed > 0)
}

// ─── Row mapping ──────────────────────────────────────────────────────────────

struct AppointmentRow {
    id: String,
    user_id: String,
    booking_type: String,
    date: String,
    time_slot: String,
    purpose: String,
    status: String,
    cancel_reason: Option<String>,
    reschedule_history: Option<String>,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        booking_type: row.get(2)?,
        date: row.get(3)?,
        time_slot: row.get(4)?,
        purpose: row.get(5)?,
        status: row.get(6)?,
        cancel_reason: row.get(7)?,
        reschedule_history: row.get(8)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        booking_type: BookingType::from_str(&row.booking_type)?,
        date: parse_date(&row.date)?,
        time_slot: NaiveTime::parse_from_str(&row.time_slot, "%H:%M")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        purpose: row.purpose,
        status: AppointmentStatus::from_str(&row.status)?,
        cancel_reason: row.cancel_reason,
        reschedule_history: match row.reschedule_history {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            None => Vec::new(),
        },
    })
}

fn history_json(history: &[RescheduleEntry]) -> Result<Option<String>, DatabaseError> {
    if history.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(history)
        .map(Some)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
