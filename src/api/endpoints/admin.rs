//! Admin endpoints: parish logo/asset management.

use std::str::FromStr;

use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::admin::{upload_asset, LOGO_ASSET};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::list_assets;
use crate::models::{Asset, SupportingFileType};

#[derive(Deserialize)]
pub struct LogoBody {
    pub file_name: String,
    /// png or jpeg
    pub file_type: String,
    /// Base64-encoded content
    pub data: String,
}

#[derive(Serialize)]
pub struct LogoResponse {
    pub asset: Asset,
}

/// `POST /api/admin/assets/logo` — upload/replace the parish logo.
pub async fn upload_logo(
    State(ctx): State<ApiContext>,
    Json(body): Json<LogoBody>,
) -> Result<Json<LogoResponse>, ApiError> {
    let declared = SupportingFileType::from_str(&body.file_type)
        .ok()
        .filter(|t| matches!(t, SupportingFileType::Png | SupportingFileType::Jpeg))
        .ok_or_else(|| ApiError::BadRequest("logo must be png or jpeg".into()))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&body.data)
        .map_err(|_| ApiError::BadRequest("logo data is not valid base64".into()))?;

    let conn = ctx.open_db()?;
    let asset = upload_asset(&conn, &ctx.assets, LOGO_ASSET, &body.file_name, declared, &bytes)?;

    Ok(Json(LogoResponse { asset }))
}

#[derive(Serialize)]
pub struct AssetsResponse {
    pub assets: Vec<Asset>,
}

/// `GET /api/admin/assets`
pub async fn assets(State(ctx): State<ApiContext>) -> Result<Json<AssetsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let assets = list_assets(&conn)?;
    Ok(Json(AssetsResponse { assets }))
}
