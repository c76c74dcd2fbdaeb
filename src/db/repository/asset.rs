use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Asset;

use super::appointment::parse_uuid;
use super::notification::parse_datetime;

/// Insert or replace by unique asset name — re-uploading the parish logo
/// overwrites the previous registration.
pub fn upsert_asset(conn: &Connection, asset: &Asset) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO assets (id, name, file_name, content_type, size_bytes,
         stored_path, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(name) DO UPDATE SET
             file_name = excluded.file_name,
             content_type = excluded.content_type,
             size_bytes = excluded.size_bytes,
             stored_path = excluded.stored_path,
             uploaded_at = excluded.uploaded_at",
        params![
            asset.id.to_string(),
            asset.name,
            asset.file_name,
            asset.content_type,
            asset.size_bytes as i64,
            asset.stored_path,
            asset.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_asset_by_name(conn: &Connection, name: &str) -> Result<Option<Asset>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, file_name, content_type, size_bytes, stored_path, uploaded_at
         FROM assets WHERE name = ?1",
        params![name],
        map_row,
    );

    match result {
        Ok(row) => Ok(Some(asset_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_assets(conn: &Connection) -> Result<Vec<Asset>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, file_name, content_type, size_bytes, stored_path, uploaded_at
         FROM assets ORDER BY name ASC",
    )?;

    let rows = stmt.query_map([], map_row)?;

    let mut assets = Vec::new();
    for row in rows {
        assets.push(asset_from_row(row?)?);
    }
    Ok(assets)
}

type AssetRow = (String, String, String, String, i64, String, String);

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssetRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn asset_from_row(
    (id, name, file_name, content_type, size_bytes, stored_path, uploaded_at): AssetRow,
) -> Result<Asset, DatabaseError> {
    Ok(Asset {
        id: parse_uuid(&id)?,
        name,
        file_name,
        content_type,
        size_bytes: size_bytes as u64,
        stored_path,
        uploaded_at: parse_datetime(&uploaded_at)?,
    })
}
