//! File info and validation handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use tubegrid_models::FileCode;
use tubegrid_upstream::Envelope;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Validation response.
#[derive(Serialize)]
pub struct ValidateResponse {
    pub status: u16,
    pub valid: bool,
}

/// Fetch file metadata. The upstream envelope is forwarded verbatim.
pub async fn get_file_info(
    State(state): State<AppState>,
    Path(file_code): Path<String>,
) -> ApiResult<Json<Envelope>> {
    let code = parse_code(&file_code)?;
    let envelope = state.upstream.file_info(&code).await?;
    Ok(Json(envelope))
}

/// Check whether a file code refers to a live asset.
///
/// Always HTTP 200; an unreachable upstream reports `valid: false` with a
/// 500 marker in the body, so page-load gating never throws.
pub async fn validate_file(
    State(state): State<AppState>,
    Path(file_code): Path<String>,
) -> ApiResult<Json<ValidateResponse>> {
    let code = parse_code(&file_code)?;

    match state.upstream.validate(&code).await {
        Ok(valid) => {
            info!(code = %code, valid, "validated file");
            Ok(Json(ValidateResponse { status: 200, valid }))
        }
        Err(e) => {
            warn!(code = %code, error = %e, "validation failed");
            Ok(Json(ValidateResponse {
                status: 500,
                valid: false,
            }))
        }
    }
}

pub(crate) fn parse_code(raw: &str) -> ApiResult<FileCode> {
    FileCode::parse(raw).map_err(|_| ApiError::bad_request("Invalid file code"))
}
