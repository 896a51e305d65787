//! Video listing and search passthrough handlers.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// List videos query params.
#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Search query params.
#[derive(Deserialize)]
pub struct SearchQuery {
    pub search_term: Option<String>,
}

/// List videos, paginated.
///
/// An upstream failure degrades to an empty file list with HTTP 200: a broken
/// upstream must never break the grid render.
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = normalize_per_page(query.per_page);

    info!(page, per_page, "list videos");

    match state.upstream.list_files(page, per_page).await {
        Ok(envelope) if envelope.is_ok() => Json(envelope).into_response(),
        Ok(envelope) => {
            warn!(msg = %envelope.msg, "upstream list rejected");
            Json(json!({
                "success": true,
                "result": { "files": [] },
                "msg": envelope.msg,
            }))
            .into_response()
        }
        Err(e) => {
            warn!(error = %e, "upstream list failed");
            Json(json!({
                "success": true,
                "result": { "files": [] },
                "error": "Failed to fetch video list",
            }))
            .into_response()
        }
    }
}

/// Search videos by title. Straight passthrough of the upstream envelope.
pub async fn search_videos(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Response> {
    let term = query
        .search_term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("search_term query param is required"))?;

    info!(term, "search videos");

    let envelope = state.upstream.search(term).await?;
    Ok(Json(envelope).into_response())
}

fn normalize_per_page(per_page: Option<u32>) -> u32 {
    match per_page {
        Some(0) | None => DEFAULT_PAGE_SIZE,
        Some(p) if p > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
        Some(p) => p,
    }
}
