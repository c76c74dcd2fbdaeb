//! Appointment lifecycle — create, cancel, reschedule, complete.
//!
//! The legal transitions are exactly:
//!   pending → cancelled   (terminal)
//!   pending → pending     (reschedule: date/time replaced, history appended)
//!   pending → completed   (staff action, terminal)
//!
//! `rescheduled` rows written by older staff tooling count as open
//! bookings for cancel/reschedule. Terminal checks and writes happen in
//! one conditional UPDATE, so two racing calls on the same booking
//! cannot both win.

use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{
    apply_reschedule, get_appointment, insert_appointment, mark_cancelled, mark_completed,
};
use crate::lifecycle::LifecycleError;
use crate::models::{Appointment, AppointmentStatus, NotificationKind, RescheduleEntry};
use crate::notify::notify;
use crate::validation::{
    check_bookable_date, parse_slot, validate_appointment_input, AppointmentForm,
};

/// Validate a booking form and persist a new pending appointment.
pub fn create(
    conn: &Connection,
    user_id: Uuid,
    form: &AppointmentForm,
    today: NaiveDate,
) -> Result<Uuid, LifecycleError> {
    let cmd = validate_appointment_input(form, today)?;

    let appointment = Appointment {
        id: Uuid::new_v4(),
        user_id,
        booking_type: cmd.booking_type,
        date: cmd.date,
        time_slot: cmd.time_slot,
        purpose: cmd.purpose,
        status: AppointmentStatus::Pending,
        cancel_reason: None,
        reschedule_history: Vec::new(),
    };
    insert_appointment(conn, &appointment)?;

    notify(
        conn,
        user_id,
        NotificationKind::AppointmentBooked,
        format!(
            "Your {} appointment on {} at {} has been received.",
            appointment.booking_type.as_str(),
            appointment.date,
            appointment.time_slot.format("%H:%M"),
        ),
    );

    tracing::info!(
        appointment_id = %appointment.id,
        booking_type = appointment.booking_type.as_str(),
        date = %appointment.date,
        "Appointment created"
    );
    Ok(appointment.id)
}

/// Cancel an open booking. Idempotence contract: the first call wins,
/// every later call sees `AlreadyTerminal` and the stored state does
/// not change again.
pub fn cancel(conn: &Connection, id: &Uuid, reason: &str) -> Result<(), LifecycleError> {
    let appointment = get_appointment(conn, id)?.ok_or(LifecycleError::NotFound)?;

    if appointment.status.is_terminal() {
        return Err(LifecycleError::AlreadyTerminal);
    }

    // Conditional write: a cancel/complete racing ahead of us flips this
    // to false, never to a double write.
    if !mark_cancelled(conn, id, reason)? {
        return Err(LifecycleError::AlreadyTerminal);
    }

    notify(
        conn,
        appointment.user_id,
        NotificationKind::AppointmentCancelled,
        format!(
            "Your {} appointment on {} was cancelled: {reason}",
            appointment.booking_type.as_str(),
            appointment.date,
        ),
    );

    tracing::info!(appointment_id = %id, "Appointment cancelled");
    Ok(())
}

/// Move an open booking to a new date and slot. The new values pass the
/// same rules as a fresh booking; the old values are appended to the
/// reschedule history and the status returns to `pending`.
pub fn reschedule(
    conn: &Connection,
    id: &Uuid,
    new_date: NaiveDate,
    new_time: &str,
    reason: &str,
    today: NaiveDate,
) -> Result<(), LifecycleError> {
    check_bookable_date(new_date, today)?;
    let new_slot = parse_slot(new_time)?;

    let appointment = get_appointment(conn, id)?.ok_or(LifecycleError::NotFound)?;

    if appointment.status.is_terminal() {
        return Err(LifecycleError::AlreadyTerminal);
    }

    let mut history = appointment.reschedule_history.clone();
    history.push(RescheduleEntry {
        old_date: appointment.date,
        old_time: appointment.time_slot,
        reason: reason.to_string(),
        moved_on: today,
    });

    if !apply_reschedule(conn, id, new_date, new_slot, &history)? {
        return Err(LifecycleError::AlreadyTerminal);
    }

    notify(
        conn,
        appointment.user_id,
        NotificationKind::AppointmentRescheduled,
        format!(
            "Your {} appointment was moved to {} at {}.",
            appointment.booking_type.as_str(),
            new_date,
            new_slot.format("%H:%M"),
        ),
    );

    tracing::info!(appointment_id = %id, new_date = %new_date, "Appointment rescheduled");
    Ok(())
}

/// Staff action closing out a held appointment. Only legal from
/// `pending`; a `rescheduled` row must be re-confirmed (rescheduled
/// back into `pending`) before completion.
pub fn complete(conn: &Connection, id: &Uuid) -> Result<(), LifecycleError> {
    let appointment = get_appointment(conn, id)?.ok_or(LifecycleError::NotFound)?;

    match appointment.status {
        AppointmentStatus::Cancelled | AppointmentStatus::Completed => {
            return Err(LifecycleError::AlreadyTerminal)
        }
        AppointmentStatus::Rescheduled => return Err(LifecycleError::InvalidTransition),
        AppointmentStatus::Pending => {}
    }

    if !mark_completed(conn, id)? {
        // Lost the race to a cancel or another complete.
        return Err(LifecycleError::AlreadyTerminal);
    }

    notify(
        conn,
        appointment.user_id,
        NotificationKind::AppointmentCompleted,
        format!(
            "Your {} appointment on {} is completed.",
            appointment.booking_type.as_str(),
            appointment.date,
        ),
    );

    tracing::info!(appointment_id = %id, "Appointment completed");
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
