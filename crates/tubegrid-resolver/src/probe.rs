//! Probe traits and their HTTP implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use tubegrid_models::{FileCode, ThumbnailStatus};

#[derive(Debug, Error)]
pub enum ProbeError {
    /// The image did not load (proxy said not ready, or the body is unusable).
    #[error("image not loadable: {0}")]
    Load(String),

    #[error("probe request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("probe timed out")]
    Timeout,
}

/// Attempt to display an image; success means the card can show it.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn load(&self, url: &str) -> Result<(), ProbeError>;
}

/// The thumbnail-status polling tier.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn check(&self, code: &FileCode) -> Result<ThumbnailStatus, ProbeError>;
}

/// Image probe that fetches through the proxy surface.
///
/// The proxy collapses every failure mode to a 404, so "loads" reduces to
/// "the proxy answered 2xx with a body".
pub struct HttpImageProbe {
    http: Client,
}

impl HttpImageProbe {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn load(&self, url: &str) -> Result<(), ProbeError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Load(format!("status {status}")));
        }
        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(ProbeError::Load("empty body".to_string()));
        }
        Ok(())
    }
}

/// Status probe against `GET {api_base}/thumbnail/{file_code}`.
pub struct HttpStatusProbe {
    http: Client,
    api_base: String,
}

impl HttpStatusProbe {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, ProbeError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.into(),
        })
    }
}

#[async_trait]
impl StatusProbe for HttpStatusProbe {
    async fn check(&self, code: &FileCode) -> Result<ThumbnailStatus, ProbeError> {
        let url = format!("{}/thumbnail/{}", self.api_base, code);
        let status: ThumbnailStatus = self.http.get(&url).send().await?.json().await?;
        Ok(status)
    }
}
