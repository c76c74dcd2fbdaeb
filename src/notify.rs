//! Notification sink.
//!
//! Fire-and-forget: a lifecycle transition calls `notify` exactly once
//! after its write lands, and a failed insert must never roll the
//! transition back — it is logged and dropped.

use chrono::Local;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::insert_notification;
use crate::models::{Notification, NotificationKind};

pub fn notify(conn: &Connection, user_id: Uuid, kind: NotificationKind, message: String) {
    let notification = Notification {
        id: Uuid::new_v4(),
        user_id,
        kind,
        message,
        is_read: false,
        created_at: Local::now().naive_local(),
    };

    if let Err(e) = insert_notification(conn, &notification) {
        tracing::warn!(
            error = %e,
            user_id = %user_id,
            kind = kind.as_str(),
            "Notification insert failed; lifecycle transition unaffected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_user, list_notifications_for_user};
    use crate::db::sqlite::open_memory_database;
    use crate::models::{User, UserRole};

    fn seeded_user(conn: &Connection) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            name: "Maria Santos".into(),
            email: "maria@example.org".into(),
            role: UserRole::Parishioner,
        };
        insert_user(conn, &user).unwrap();
        user.id
    }

    #[test]
    fn notify_records_one_unread_entry() {
        let conn = open_memory_database().unwrap();
        let user_id = seeded_user(&conn);

        notify(
            &conn,
            user_id,
            NotificationKind::AppointmentBooked,
            "Your baptism appointment is booked.".into(),
        );

        let list = list_notifications_for_user(&conn, &user_id).unwrap();
        assert_eq!(list.len(), 1);
        assert!(!list[0].is_read);
        assert_eq!(list[0].kind, NotificationKind::AppointmentBooked);
    }

    #[test]
    fn notify_failure_is_swallowed() {
        let conn = open_memory_database().unwrap();
        let unknown_user = Uuid::new_v4();

        // FK violation inside — must not panic or propagate
        notify(
            &conn,
            unknown_user,
            NotificationKind::RequestSubmitted,
            "orphan".into(),
        );

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM notifications", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
