use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{DocumentKind, DocumentRequest, RequestStatus, SupportingFile};

use super::appointment::{parse_date, parse_uuid};

/// Insert a request and all of its file rows in one transaction.
/// Either the request lands with every file, or nothing lands.
pub fn insert_request_with_files(
    conn: &Connection,
    request: &DocumentRequest,
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO document_requests (id, user_id, document_kind, purpose,
         status, request_date, ready_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            request.id.to_string(),
            request.user_id.to_string(),
            request.document_kind.as_str(),
            request.purpose,
            request.status.as_str(),
            request.request_date.to_string(),
            request.ready_date.map(|d| d.to_string()),
        ],
    )?;

    for file in &request.files {
        tx.execute(
            "INSERT INTO request_files (id, request_id, file_name, content_type,
             size_bytes, stored_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                file.id.to_string(),
                request.id.to_string(),
                file.file_name,
                file.content_type,
                file.size_bytes as i64,
                file.stored_path,
            ],
        )?;
    }

    tx.commit()?;
    Ok(())
}

pub fn get_request(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<DocumentRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, document_kind, purpose, status, request_date, ready_date
         FROM document_requests WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], map_row);

    match result {
        Ok(row) => {
            let mut request = request_from_row(row)?;
            request.files = files_for_request(conn, id)?;
            Ok(Some(request))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_requests_for_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<DocumentRequest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, document_kind, purpose, status, request_date, ready_date
         FROM document_requests WHERE user_id = ?1
         ORDER BY request_date DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], map_row)?;

    let mut requests = Vec::new();
    for row in rows {
        let mut request = request_from_row(row?)?;
        let id = request.id;
        request.files = files_for_request(conn, &id)?;
        requests.push(request);
    }
    Ok(requests)
}

/// Conditional single-step advance. `ready_date` is written in the same
/// statement, so it can only land together with the transition into `ready`.
pub fn advance_status(
    conn: &Connection,
    id: &Uuid,
    from: RequestStatus,
    to: RequestStatus,
    ready_date: Option<NaiveDate>,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE document_requests
         SET status = ?2, ready_date = COALESCE(?3, ready_date)
         WHERE id = ?1 AND status = ?4",
        params![
            id.to_string(),
            to.as_str(),
            ready_date.map(|d| d.to_string()),
            from.as_str(),
        ],
    )?;
    Ok(changed > 0)
}

fn files_for_request(
    conn: &Connection,
    request_id: &Uuid,
) -> Result<Vec<SupportingFile>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, request_id, file_name, content_type, size_bytes, stored_path
         FROM request_files WHERE request_id = ?1
         ORDER BY file_name ASC",
    )?;

    let rows = stmt.query_map(params![request_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut files = Vec::new();
    for row in rows {
        let (id, req_id, file_name, content_type, size_bytes, stored_path) = row?;
        files.push(SupportingFile {
            id: parse_uuid(&id)?,
            request_id: parse_uuid(&req_id)?,
            file_name,
            content_type,
            size_bytes: size_bytes as u64,
            stored_path,
        });
    }
    Ok(files)
}

struct RequestRow {
    id: String,
    user_id: String,
    document_kind: String,
    purpose: String,
    status: String,
    request_date: String,
    ready_date: Option<String>,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        document_kind: row.get(2)?,
        purpose: row.get(3)?,
        status: row.get(4)?,
        request_date: row.get(5)?,
        ready_date: row.get(6)?,
    })
}

fn request_from_row(row: RequestRow) -> Result<DocumentRequest, DatabaseError> {
    Ok(DocumentRequest {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        document_kind: DocumentKind::from_str(&row.document_kind)?,
        purpose: row.purpose,
        status: RequestStatus::from_str(&row.status)?,
        request_date: parse_date(&row.request_date)?,
        ready_date: row.ready_date.as_deref().map(parse_date).transpose()?,
        files: Vec::new(),
    })
}
