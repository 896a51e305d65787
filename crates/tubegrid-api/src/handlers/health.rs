//! Health check and deployment config handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Deployment config advertised to the frontend.
#[derive(Serialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub backend_url: String,
    pub api_url: String,
}

/// Tell the frontend where the API lives.
///
/// The value is injected at startup; clients must not guess it from their own
/// location.
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let backend_url = state.config.public_base_url.clone();
    let api_url = format!("{}/api", backend_url.trim_end_matches('/'));
    Json(ConfigResponse {
        success: true,
        backend_url,
        api_url,
    })
}
