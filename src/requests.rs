//! Document request lifecycle — submit, then a strictly linear
//! forward-only advance: pending → processing → ready → picked_up.
//!
//! Submission is all-or-nothing: every supporting file must validate
//! and land in the file store before the request row is written, and
//! the request row plus its file rows go in as one transaction. A
//! storage failure therefore never leaves a pending request without
//! files.

use chrono::NaiveDate;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{advance_status, get_request, insert_request_with_files};
use crate::lifecycle::LifecycleError;
use crate::models::{
    DocumentKind, DocumentRequest, NotificationKind, RequestStatus, SupportingFile,
    SupportingFileType,
};
use crate::notify::notify;
use crate::storage::FileStore;
use crate::validation::{
    validate_document_request_input, DocumentRequestForm, UploadMeta,
};

/// One uploaded file as received from the client: declared type plus
/// raw content. `declared_type` is `None` when the declared value is
/// outside the accepted set.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub file_name: String,
    pub declared_type: Option<SupportingFileType>,
    pub bytes: Vec<u8>,
}

/// Raw submission before validation.
#[derive(Debug, Clone, Default)]
pub struct SubmitForm {
    pub document_kind: Option<DocumentKind>,
    pub purpose: Option<String>,
    pub files: Vec<FilePayload>,
}

/// Validate and persist a new document request with its files.
pub fn submit(
    conn: &Connection,
    store: &FileStore,
    user_id: Uuid,
    form: &SubmitForm,
    today: NaiveDate,
) -> Result<Uuid, LifecycleError> {
    let meta_form = DocumentRequestForm {
        document_kind: form.document_kind,
        purpose: form.purpose.clone(),
        files: form
            .files
            .iter()
            .map(|f| UploadMeta {
                file_name: f.file_name.clone(),
                file_type: f.declared_type,
                size_bytes: f.bytes.len() as u64,
            })
            .collect(),
    };
    let cmd = validate_document_request_input(&meta_form)?;

    // Store every blob before any DB write; a failure here aborts the
    // submission with no request record. Blobs already stored for this
    // submission are cleaned up best-effort.
    let request_id = Uuid::new_v4();
    let mut files = Vec::with_capacity(cmd.files.len());
    for (accepted, payload) in cmd.files.iter().zip(&form.files) {
        let stored = match store.store(&payload.bytes, &accepted.file_name, accepted.file_type) {
            Ok(stored) => stored,
            Err(e) => {
                discard_stored(&files);
                return Err(e.into());
            }
        };
        files.push(SupportingFile {
            id: Uuid::new_v4(),
            request_id,
            file_name: stored.file_name,
            content_type: stored.content_type,
            size_bytes: stored.size_bytes,
            stored_path: stored.path.to_string_lossy().into_owned(),
        });
    }

    let request = DocumentRequest {
        id: request_id,
        user_id,
        document_kind: cmd.document_kind,
        purpose: cmd.purpose,
        status: RequestStatus::Pending,
        request_date: today,
        ready_date: None,
        files,
    };
    if let Err(e) = insert_request_with_files(conn, &request) {
        discard_stored(&request.files);
        return Err(e.into());
    }

    notify(
        conn,
        user_id,
        NotificationKind::RequestSubmitted,
        format!(
            "Your {} request has been received and is pending review.",
            request.document_kind.as_str(),
        ),
    );

    tracing::info!(
        request_id = %request.id,
        document_kind = request.document_kind.as_str(),
        files = request.files.len(),
        "Document request submitted"
    );
    Ok(request.id)
}

/// Move a request exactly one stage forward. Entering `ready` stamps
/// `ready_date` in the same conditional update.
pub fn advance(
    conn: &Connection,
    id: &Uuid,
    today: NaiveDate,
) -> Result<RequestStatus, LifecycleError> {
    let request = get_request(conn, id)?.ok_or(LifecycleError::NotFound)?;

    let next = request.status.next().ok_or(LifecycleError::AlreadyTerminal)?;
    let ready_date = (next == RequestStatus::Ready).then_some(today);

    if !advance_status(conn, id, request.status, next, ready_date)? {
        // The row moved between our read and write; the step we computed
        // is no longer legal from the current state.
        let current = get_request(conn, id)?.ok_or(LifecycleError::NotFound)?;
        return Err(if current.status.next().is_none() {
            LifecycleError::AlreadyTerminal
        } else {
            LifecycleError::InvalidTransition
        });
    }

    notify(
        conn,
        request.user_id,
        NotificationKind::RequestAdvanced,
        match next {
            RequestStatus::Ready => format!(
                "Your {} request is ready for pickup at the parish office.",
                request.document_kind.as_str(),
            ),
            other => format!(
                "Your {} request is now {}.",
                request.document_kind.as_str(),
                other.as_str(),
            ),
        },
    );

    tracing::info!(request_id = %id, status = next.as_str(), "Document request advanced");
    Ok(next)
}

fn discard_stored(files: &[SupportingFile]) {
    for file in files {
        if let Err(e) = std::fs::remove_file(&file.stored_path) {
            tracing::warn!(path = %file.stored_path, error = %e, "Orphaned upload not removed");
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
