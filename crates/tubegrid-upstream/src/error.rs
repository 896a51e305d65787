//! Upstream client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream API key is not configured")]
    MissingApiKey,

    /// Transport-level failure: timeout, DNS, TLS, connection reset.
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a status we refuse to inspect (>= 500).
    #[error("upstream returned status {0}")]
    BadStatus(u16),

    #[error("upstream API error: {0}")]
    Api(String),

    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
