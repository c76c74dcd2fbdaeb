//! Admin surface: parish asset management (logo uploads) and the
//! initial account bootstrap.

use chrono::Local;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{admin_exists, get_user_by_email, insert_user, upsert_asset};
use crate::db::DatabaseError;
use crate::lifecycle::LifecycleError;
use crate::models::{Asset, SupportingFileType, User, UserRole};
use crate::storage::FileStore;

/// Asset name the portal header logo is registered under.
pub const LOGO_ASSET: &str = "logo";

const DEFAULT_ADMIN_NAME: &str = "Parish Administrator";
const DEFAULT_ADMIN_EMAIL: &str = "admin@parish.local";

/// Create the default administrator account if none exists yet.
/// Idempotent: safe to call on every startup.
pub fn ensure_admin_account(conn: &Connection) -> Result<User, DatabaseError> {
    if admin_exists(conn)? {
        if let Some(existing) = get_user_by_email(conn, DEFAULT_ADMIN_EMAIL)? {
            return Ok(existing);
        }
        // An admin exists under another email; report it instead of
        // creating a duplicate bootstrap account.
        return get_first_admin(conn);
    }

    let admin = User {
        id: Uuid::new_v4(),
        name: DEFAULT_ADMIN_NAME.into(),
        email: DEFAULT_ADMIN_EMAIL.into(),
        role: UserRole::Admin,
    };
    insert_user(conn, &admin)?;
    tracing::info!(user_id = %admin.id, "Bootstrapped default administrator account");
    Ok(admin)
}

fn get_first_admin(conn: &Connection) -> Result<User, DatabaseError> {
    let email: String = conn.query_row(
        "SELECT email FROM users WHERE role = 'admin' ORDER BY created_at ASC LIMIT 1",
        [],
        |row| row.get(0),
    )?;
    get_user_by_email(conn, &email)?.ok_or(DatabaseError::NotFound {
        entity_type: "User".into(),
        id: email,
    })
}

/// Store an uploaded asset and register it under the given unique name.
/// Re-uploading under the same name replaces the registration.
pub fn upload_asset(
    conn: &Connection,
    store: &FileStore,
    name: &str,
    original_file_name: &str,
    declared: SupportingFileType,
    bytes: &[u8],
) -> Result<Asset, LifecycleError> {
    let stored = store.store(bytes, original_file_name, declared)?;

    let asset = Asset {
        id: Uuid::new_v4(),
        name: name.to_string(),
        file_name: stored.file_name,
        content_type: stored.content_type,
        size_bytes: stored.size_bytes,
        stored_path: stored.path.to_string_lossy().into_owned(),
        uploaded_at: Local::now().naive_local(),
    };
    upsert_asset(conn, &asset)?;

    tracing::info!(asset = name, file = asset.file_name, "Asset uploaded");
    Ok(asset)
}
