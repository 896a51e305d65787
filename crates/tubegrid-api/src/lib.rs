//! Axum REST proxy in front of the upstream video host.
//!
//! This crate provides:
//! - Pass-through listing/search/file-info endpoints
//! - The thumbnail proxy pipeline with blank-image filtering
//! - The thumbnail-status endpoint the resolver polls
//! - Embed URL construction

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ThumbCachePolicy};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
