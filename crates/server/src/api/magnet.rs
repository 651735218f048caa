//! Magnet link API handlers.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use torrentwave_core::{is_valid_info_hash, parse_magnet, MagnetLink};

use super::handlers::{error_response, ApiError};

#[derive(Debug, Deserialize)]
pub struct ParseMagnetRequest {
    pub uri: String,
}

#[derive(Debug, Serialize)]
pub struct ParseMagnetResponse {
    #[serde(flatten)]
    pub magnet: MagnetLink,
    /// Whether the info hash has a v1 shape (40 hex or 32 base32 chars).
    pub valid_info_hash: bool,
}

/// POST /api/v1/magnet/parse
pub async fn parse(
    Json(body): Json<ParseMagnetRequest>,
) -> Result<Json<ParseMagnetResponse>, ApiError> {
    let magnet = parse_magnet(&body.uri)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Not a valid magnet link"))?;

    Ok(Json(ParseMagnetResponse {
        valid_info_hash: is_valid_info_hash(&magnet.info_hash),
        magnet,
    }))
}
