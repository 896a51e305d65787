//! Thumbnail proxy and thumbnail status handlers.
//!
//! The proxy fetches externally hosted thumbnails on behalf of the browser
//! (the CDN blocks hotlinked requests), filters out the upstream's blank
//! "still transcoding" placeholders, and collapses every failure mode into a
//! 404 so the browser-side fallback chain stays uniform. A 5xx here would
//! break that chain; the proxy never emits one for a thumbnail.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use tubegrid_models::{classify_response, ProxyOutcome, ThumbnailStatus};

use crate::error::{ApiError, ApiResult};
use crate::handlers::files::parse_code;
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Proxy query params.
#[derive(Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
    /// Advisory marker set by the caller when this is its fallback tier.
    pub fallback: Option<String>,
}

/// Thumbnail status response: the resolver's polling tier.
#[derive(Serialize)]
pub struct ThumbStatusResponse {
    pub success: bool,
    #[serde(flatten)]
    pub status: ThumbnailStatus,
}

/// Report whether the upstream has generated thumbnails for a file.
pub async fn thumbnail_status(
    State(state): State<AppState>,
    Path(file_code): Path<String>,
) -> ApiResult<Json<ThumbStatusResponse>> {
    let code = parse_code(&file_code)?;
    let status = state.upstream.thumbnail_lookup(&code).await?;

    info!(
        code = %code,
        has_thumbnail = status.has_thumbnail,
        "thumbnail status"
    );

    Ok(Json(ThumbStatusResponse {
        success: true,
        status,
    }))
}

/// Proxy one thumbnail fetch.
pub async fn proxy_thumb(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> ApiResult<Response> {
    let raw_url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("url query param is required"))?;
    let is_fallback = query.fallback.as_deref() == Some("1");

    let url = Url::parse(raw_url).map_err(|_| ApiError::bad_request("Invalid URL"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ApiError::bad_request("Invalid URL"));
    }

    check_allowlist(&state, &url)?;

    let fetched = match state.fetcher.fetch(raw_url).await {
        Ok(fetched) => fetched,
        Err(e) => {
            // Timeout, DNS, TLS, or upstream 5xx. The client retries later.
            warn!(url = raw_url, is_fallback, error = %e, "thumbnail fetch failed");
            return Err(ApiError::not_ready("Error proxying image"));
        }
    };

    let outcome = classify_response(
        fetched.status,
        fetched.content_type.as_deref(),
        fetched.body.len(),
    );

    info!(
        url = raw_url,
        is_fallback,
        upstream_status = fetched.status,
        bytes = fetched.body.len(),
        outcome = ?outcome_label(&outcome),
        "proxied thumbnail"
    );

    match outcome {
        ProxyOutcome::NotReady => Err(ApiError::not_ready("Still processing")),
        ProxyOutcome::RemoteError => Err(ApiError::not_found("Image not ready")),
        ProxyOutcome::Served { content_type, .. } => {
            let content_type =
                content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type),
                    (
                        header::ACCESS_CONTROL_ALLOW_ORIGIN,
                        "*".to_string(),
                    ),
                    (
                        header::CACHE_CONTROL,
                        state.config.thumb_cache_policy.header_value().to_string(),
                    ),
                ],
                fetched.body,
            )
                .into_response())
        }
    }
}

/// Hosts outside the known CDN list are suspicious but, by default, still
/// fetched; some deployments lock this down.
fn check_allowlist(state: &AppState, url: &Url) -> ApiResult<()> {
    let host = url.host_str().unwrap_or_default();
    let allowed = state
        .config
        .thumb_allowed_domains
        .iter()
        .any(|domain| host.contains(domain.as_str()));

    if !allowed {
        if state.config.allowlist_enforced {
            warn!(host, "rejected non-allow-listed thumbnail host");
            return Err(ApiError::bad_request("Host not allowed"));
        }
        warn!(host, "fetching non-allow-listed thumbnail host");
    }
    Ok(())
}

fn outcome_label(outcome: &ProxyOutcome) -> &'static str {
    match outcome {
        ProxyOutcome::Served { .. } => "served",
        ProxyOutcome::NotReady => "not_ready",
        ProxyOutcome::RemoteError => "remote_error",
    }
}
