use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DocumentKind, RequestStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_kind: DocumentKind,
    pub purpose: String,
    pub status: RequestStatus,
    pub request_date: NaiveDate,
    pub ready_date: Option<NaiveDate>,
    pub files: Vec<SupportingFile>,
}

/// Metadata row for one stored supporting file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportingFile {
    pub id: Uuid,
    pub request_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub stored_path: String,
}
