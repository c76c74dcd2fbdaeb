use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A parish site asset (logo, letterhead) managed from the admin screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub stored_path: String,
    pub uploaded_at: NaiveDateTime,
}
