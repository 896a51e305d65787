//! API routes.

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::embed::get_embed_url;
use crate::handlers::files::{get_file_info, validate_file};
use crate::handlers::health::{get_config, health};
use crate::handlers::thumbs::{proxy_thumb, thumbnail_status};
use crate::handlers::videos::{list_videos, search_videos};
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .route("/videos", get(list_videos))
        .route("/search", get(search_videos))
        .route("/file/:file_code", get(get_file_info))
        .route("/validate/:file_code", get(validate_file))
        .route("/embed/:file_code", get(get_embed_url))
        .route("/thumbnail/:file_code", get(thumbnail_status))
        .route("/proxy-thumb", get(proxy_thumb))
        .route("/config", get(get_config))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
