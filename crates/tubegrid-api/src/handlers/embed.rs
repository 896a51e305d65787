//! Embed URL construction.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use tubegrid_models::FileCode;

use crate::error::ApiResult;
use crate::handlers::files::parse_code;
use crate::state::AppState;

/// Embed query params.
#[derive(Deserialize)]
pub struct EmbedQuery {
    pub poster: Option<String>,
}

/// Embed response.
#[derive(Serialize)]
pub struct EmbedResponse {
    pub success: bool,
    pub embed_url: String,
}

/// Construct the player embed URL for a file, optionally carrying a poster
/// image. Purely deterministic; no upstream call.
pub async fn get_embed_url(
    State(state): State<AppState>,
    Path(file_code): Path<String>,
    Query(query): Query<EmbedQuery>,
) -> ApiResult<Json<EmbedResponse>> {
    let code = parse_code(&file_code)?;
    let embed_url = build_embed_url(&state.config.embed_base, &code, query.poster.as_deref());
    Ok(Json(EmbedResponse {
        success: true,
        embed_url,
    }))
}

/// `{embed_base}/e/{code}`, plus `?c_poster=` when a poster is given.
///
/// Posters arrive scheme-less from some upstream fields; they get `https://`
/// prefixed before encoding.
pub fn build_embed_url(embed_base: &str, code: &FileCode, poster: Option<&str>) -> String {
    let base = embed_base.trim_end_matches('/');
    let mut embed_url = format!("{base}/e/{code}");

    if let Some(poster) = poster.map(str::trim).filter(|p| !p.is_empty()) {
        let poster_url = if poster.starts_with("http") {
            poster.to_string()
        } else {
            format!("https://{poster}")
        };
        embed_url.push_str("?c_poster=");
        embed_url.push_str(&urlencoding::encode(&poster_url));
    }

    embed_url
}
