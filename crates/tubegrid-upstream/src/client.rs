//! JSON API client for the upstream video host.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use tubegrid_models::{FileCode, ThumbnailStatus};

use crate::error::UpstreamError;

/// Upstream API configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the main API, e.g. `https://doodstream.com/api`.
    pub api_base: String,
    /// Base URL of the image API, e.g. `https://doodapi.com/api`.
    pub img_api_base: String,
    /// Referer sent on image-API calls (the canonical upstream site).
    pub referer: String,
    /// Account API key.
    pub api_key: String,
    /// Timeout for listing/search/info calls.
    pub request_timeout: Duration,
    /// Tighter timeout for validation probes.
    pub validate_timeout: Duration,
    /// Substrings a thumbnail URL must contain to be trusted as a CDN image.
    pub cdn_markers: Vec<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: "https://doodstream.com/api".to_string(),
            img_api_base: "https://doodapi.com/api".to_string(),
            referer: "https://doodstream.com/".to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(10),
            validate_timeout: Duration::from_secs(5),
            cdn_markers: vec!["doodcdn".to_string(), "postercdn".to_string()],
        }
    }
}

/// Generic `{status, msg, result}` envelope every upstream endpoint returns.
///
/// `result` stays untyped so passthrough handlers can forward the upstream's
/// payload verbatim; typed decoding happens where a field is actually read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: u16,

    #[serde(default)]
    pub msg: String,

    #[serde(default)]
    pub result: Value,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Envelope {
    /// The upstream signals success inconsistently across endpoints; treat
    /// either marker as success.
    pub fn is_ok(&self) -> bool {
        self.msg == "OK" || self.status == 200
    }
}

/// Image-API result entry carrying thumbnail URLs.
#[derive(Debug, Deserialize)]
struct ImageResult {
    #[serde(default)]
    splash_img: Option<String>,
    #[serde(default)]
    single_img: Option<String>,
}

/// Client for the upstream JSON API.
pub struct UpstreamClient {
    config: UpstreamConfig,
    http: Client,
}

impl UpstreamClient {
    /// Build a client. Fails when no API key is configured; a keyless client
    /// could only ever produce upstream auth errors.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        if config.api_key.is_empty() {
            return Err(UpstreamError::MissingApiKey);
        }
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// List files, paginated. Returns the raw envelope for passthrough.
    pub async fn list_files(&self, page: u32, per_page: u32) -> Result<Envelope, UpstreamError> {
        let url = format!("{}/file/list", self.config.api_base);
        debug!(page, per_page, "upstream file list");
        let envelope: Envelope = self
            .http
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("page", &page.to_string()),
                ("per_page", &per_page.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }

    /// Search files by title. Returns the raw envelope for passthrough.
    pub async fn search(&self, term: &str) -> Result<Envelope, UpstreamError> {
        let url = format!("{}/search", self.config.api_base);
        debug!(term, "upstream search");
        let envelope: Envelope = self
            .http
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("search_term", term),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }

    /// Fetch file metadata. Returns the raw envelope for passthrough.
    pub async fn file_info(&self, code: &FileCode) -> Result<Envelope, UpstreamError> {
        let url = format!("{}/file/info", self.config.api_base);
        let envelope: Envelope = self
            .http
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("file_code", code.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope)
    }

    /// Check whether a file code refers to a live asset.
    ///
    /// Uses a tighter timeout than the other calls; validation gates page
    /// loads and must fail fast.
    pub async fn validate(&self, code: &FileCode) -> Result<bool, UpstreamError> {
        let url = format!("{}/file/info", self.config.api_base);
        let envelope: Envelope = self
            .http
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("file_code", code.as_str()),
            ])
            .timeout(self.config.validate_timeout)
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope.msg == "OK")
    }

    /// Query the image API for a file's generated thumbnails.
    ///
    /// URLs that are off-CDN or point at the upstream's literal `blank`
    /// placeholder are discarded; the splash image is preferred as primary.
    pub async fn thumbnail_lookup(
        &self,
        code: &FileCode,
    ) -> Result<ThumbnailStatus, UpstreamError> {
        let url = format!("{}/file/image", self.config.img_api_base);
        let envelope: Envelope = self
            .http
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("file_code", code.as_str()),
            ])
            .header("Referer", &self.config.referer)
            .timeout(Duration::from_secs(15))
            .send()
            .await?
            .json()
            .await?;

        if !envelope.is_ok() {
            warn!(code = %code, msg = %envelope.msg, "thumbnail lookup rejected");
            return Ok(ThumbnailStatus::default());
        }

        // The image API wraps its result in a single-element array on some
        // endpoints and returns a bare object on others.
        let value = match &envelope.result {
            Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
            other => other.clone(),
        };
        if value.is_null() {
            return Ok(ThumbnailStatus::default());
        }
        let images: ImageResult = serde_json::from_value(value)?;

        let primary = images.splash_img.filter(|u| self.is_cdn_image(u));
        let fallback = images.single_img.filter(|u| self.is_cdn_image(u));

        Ok(ThumbnailStatus {
            has_thumbnail: primary.is_some() || fallback.is_some(),
            is_processing: primary.is_none() && fallback.is_none(),
            primary,
            fallback,
        })
    }

    fn is_cdn_image(&self, url: &str) -> bool {
        if url.is_empty() || url.contains("blank") {
            return false;
        }
        self.config.cdn_markers.is_empty()
            || self.config.cdn_markers.iter().any(|m| url.contains(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> UpstreamConfig {
        UpstreamConfig {
            api_base: format!("{}/api", server.uri()),
            img_api_base: format!("{}/api", server.uri()),
            api_key: "test-key".to_string(),
            ..UpstreamConfig::default()
        }
    }

    #[test]
    fn missing_key_is_a_constructor_error() {
        let err = UpstreamClient::new(UpstreamConfig::default()).err().unwrap();
        assert!(matches!(err, UpstreamError::MissingApiKey));
    }

    #[tokio::test]
    async fn list_files_forwards_key_and_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/list"))
            .and(query_param("key", "test-key"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 200,
                "msg": "OK",
                "result": { "files": [{ "file_code": "abc123xy", "title": "t" }] }
            })))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(test_config(&server)).unwrap();
        let envelope = client.list_files(2, 20).await.unwrap();
        assert!(envelope.is_ok());
        assert_eq!(envelope.result["files"][0]["file_code"], "abc123xy");
    }

    #[tokio::test]
    async fn validate_maps_msg_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/info"))
            .and(query_param("file_code", "abc123xy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 200, "msg": "OK", "result": []
            })))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(test_config(&server)).unwrap();
        let code = FileCode::parse("abc123xy").unwrap();
        assert!(client.validate(&code).await.unwrap());
    }

    #[tokio::test]
    async fn thumbnail_lookup_filters_blank_and_off_cdn_urls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 200,
                "msg": "OK",
                "result": [{
                    "splash_img": "https://img.doodcdn.co/blank.png",
                    "single_img": "https://img.doodcdn.co/snaps/abc123xy.jpg"
                }]
            })))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(test_config(&server)).unwrap();
        let code = FileCode::parse("abc123xy").unwrap();
        let status = client.thumbnail_lookup(&code).await.unwrap();

        assert!(status.has_thumbnail);
        assert!(status.primary.is_none());
        assert_eq!(
            status.fallback.as_deref(),
            Some("https://img.doodcdn.co/snaps/abc123xy.jpg")
        );
    }

    #[tokio::test]
    async fn thumbnail_lookup_reports_processing_when_nothing_usable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 200, "msg": "OK", "result": {}
            })))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(test_config(&server)).unwrap();
        let code = FileCode::parse("abc123xy").unwrap();
        let status = client.thumbnail_lookup(&code).await.unwrap();

        assert!(!status.has_thumbnail);
        assert!(status.is_processing);
    }

    #[tokio::test]
    async fn thumbnail_lookup_tolerates_api_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 400, "msg": "Invalid key"
            })))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(test_config(&server)).unwrap();
        let code = FileCode::parse("abc123xy").unwrap();
        let status = client.thumbnail_lookup(&code).await.unwrap();
        assert!(!status.has_thumbnail);
    }
}
