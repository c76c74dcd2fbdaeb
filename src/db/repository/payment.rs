use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Payment, PaymentStatus};

use super::appointment::parse_uuid;
use super::notification::parse_datetime;

pub fn insert_payment(conn: &Connection, payment: &Payment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payments (id, user_id, reference_id, description, amount_cents,
         status, created_at, paid_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            payment.id.to_string(),
            payment.user_id.to_string(),
            payment.reference_id.map(|id| id.to_string()),
            payment.description,
            payment.amount_cents,
            payment.status.as_str(),
            payment.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            payment.paid_at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        ],
    )?;
    Ok(())
}

pub fn list_payments_for_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Payment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, reference_id, description, amount_cents, status,
         created_at, paid_at
         FROM payments WHERE user_id = ?1
         ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, Option<String>>(7)?,
        ))
    })?;

    let mut payments = Vec::new();
    for row in rows {
        let (id, user_id, reference_id, description, amount_cents, status, created_at, paid_at) =
            row?;
        payments.push(Payment {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            reference_id: reference_id.as_deref().map(parse_uuid).transpose()?,
            description,
            amount_cents,
            status: PaymentStatus::from_str(&status)?,
            created_at: parse_datetime(&created_at)?,
            paid_at: paid_at.as_deref().map(parse_datetime).transpose()?,
        });
    }
    Ok(payments)
}

/// Conditional settle: only a pending payment can be marked paid.
pub fn mark_paid(
    conn: &Connection,
    id: &Uuid,
    paid_at: NaiveDateTime,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE payments SET status = 'paid', paid_at = ?2
         WHERE id = ?1 AND status = 'pending'",
        params![id.to_string(), paid_at.format("%Y-%m-%d %H:%M:%S").to_string()],
    )?;
    Ok(changed > 0)
}
