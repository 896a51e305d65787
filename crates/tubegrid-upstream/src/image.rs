//! Raw image fetcher for the proxy pipeline.
//!
//! The upstream CDN refuses requests that look like hotlinking, so every
//! fetch spoofs a real browser: user agent, image accept list, a referrer
//! claiming the canonical upstream site, and cache-busting headers.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, EXPIRES, PRAGMA, REFERER, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::debug;

use crate::error::UpstreamError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const IMAGE_ACCEPT: &str =
    "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// One fetched image response, pre-classification.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Shared outbound client for proxied thumbnail fetches.
pub struct ImageFetcher {
    http: Client,
    headers: HeaderMap,
}

impl ImageFetcher {
    /// Build a fetcher claiming `referer` as the originating site.
    pub fn new(
        referer: &str,
        timeout: Duration,
        max_redirects: usize,
    ) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(EXPIRES, HeaderValue::from_static("0"));
        headers.insert(
            REFERER,
            HeaderValue::from_str(referer)
                .map_err(|_| UpstreamError::InvalidUrl(referer.to_string()))?,
        );

        let http = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(max_redirects))
            .build()?;

        Ok(Self { http, headers })
    }

    /// Fetch an image URL.
    ///
    /// Statuses below 500 are returned for inspection; a 4xx body still
    /// carries signal for classification. 5xx and transport failures are
    /// errors for the caller to collapse into its not-ready path.
    pub async fn fetch(&self, url: &str) -> Result<FetchedImage, UpstreamError> {
        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        if status >= 500 {
            return Err(UpstreamError::BadStatus(status));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await?;
        debug!(url, status, bytes = body.len(), "image fetched");

        Ok(FetchedImage {
            status,
            content_type,
            body,
        })
    }
}
