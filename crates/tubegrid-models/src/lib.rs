//! Shared data models for the tubegrid backend.
//!
//! This crate provides Serde-serializable types for:
//! - Upstream file records and file codes
//! - Thumbnail status reported by the upstream image API
//! - Proxy outcome classification for fetched thumbnails

pub mod file;
pub mod thumbnail;
pub mod utils;

// Re-export common types
pub use file::{FileCode, FileCodeError, FileRecord};
pub use thumbnail::{
    classify_response, ProxyOutcome, ThumbnailStatus, BLANK_IMAGE_BYTE_THRESHOLD,
};
pub use utils::{format_duration, format_views};
