//! Document request endpoints. Supporting files arrive as base64
//! payloads with a declared type; content is re-checked against magic
//! bytes by the file store.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::Json;
use base64::Engine;
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::list_requests_for_user;
use crate::models::{DocumentKind, DocumentRequest, RequestStatus, SupportingFileType};
use crate::requests::{self, FilePayload, SubmitForm};

use super::UserQuery;

#[derive(Deserialize)]
pub struct SubmitBody {
    pub user_id: Uuid,
    pub document_kind: Option<String>,
    pub purpose: Option<String>,
    #[serde(default)]
    pub files: Vec<FileBody>,
}

#[derive(Deserialize)]
pub struct FileBody {
    pub name: String,
    /// Declared type, one of: pdf, jpeg, png, doc, docx
    pub file_type: String,
    /// Base64-encoded content
    pub data: String,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub request_id: Uuid,
    pub status: &'static str,
}

/// `POST /api/requests` — submit a document request with files.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Json(body): Json<SubmitBody>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let today = Local::now().date_naive();

    let mut files = Vec::with_capacity(body.files.len());
    for file in &body.files {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&file.data)
            .map_err(|_| ApiError::BadRequest(format!("{} is not valid base64", file.name)))?;
        files.push(FilePayload {
            file_name: file.name.clone(),
            // Unknown declared types flow through as None and fail
            // validation with BadFileType
            declared_type: SupportingFileType::from_str(&file.file_type).ok(),
            bytes,
        });
    }

    let form = SubmitForm {
        document_kind: body
            .document_kind
            .as_deref()
            .and_then(|k| DocumentKind::from_str(k).ok()),
        purpose: body.purpose.clone(),
        files,
    };

    let request_id = requests::submit(&conn, &ctx.uploads, body.user_id, &form, today)?;

    Ok(Json(SubmitResponse {
        request_id,
        status: "pending",
    }))
}

#[derive(Serialize)]
pub struct RequestsResponse {
    pub requests: Vec<DocumentRequest>,
}

/// `GET /api/requests?user_id=` — list a parishioner's requests.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<UserQuery>,
) -> Result<Json<RequestsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let requests = list_requests_for_user(&conn, &query.user_id)?;
    Ok(Json(RequestsResponse { requests }))
}

#[derive(Serialize)]
pub struct AdvanceResponse {
    pub status: RequestStatus,
}

/// `POST /api/requests/:id/advance` — staff moves a request one stage
/// forward.
pub async fn advance(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let today = Local::now().date_naive();
    let status = requests::advance(&conn, &id, today)?;
    Ok(Json(AdvanceResponse { status }))
}

/// `GET /api/requests/:id/download` — certificate download is not
/// built yet; say so instead of pretending.
pub async fn download(Path(_id): Path<Uuid>) -> ApiError {
    ApiError::NotImplemented("Certificate download")
}
