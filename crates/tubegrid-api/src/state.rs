//! Application state.

use std::sync::Arc;

use tubegrid_upstream::{ImageFetcher, UpstreamClient, UpstreamError};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub upstream: Arc<UpstreamClient>,
    pub fetcher: Arc<ImageFetcher>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(config.upstream.clone())?;
        let fetcher = ImageFetcher::new(
            &config.upstream.referer,
            config.thumb_fetch_timeout,
            config.thumb_max_redirects,
        )?;

        Ok(Self {
            config,
            upstream: Arc::new(upstream),
            fetcher: Arc::new(fetcher),
        })
    }
}
