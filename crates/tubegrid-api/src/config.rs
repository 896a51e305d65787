//! API configuration.
//!
//! Everything deployment-specific is an explicit value read once at startup;
//! nothing sniffs hostnames at runtime.

use std::time::Duration;

use tubegrid_upstream::UpstreamConfig;

/// Cache directive for successfully proxied thumbnails.
///
/// Deployments disagree on whether proxied thumbnails should be revalidated
/// every time (images change while the upstream finishes transcoding) or
/// cached for a day (stable thumbnails, less egress). Policy, not behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbCachePolicy {
    NoStore,
    PublicDay,
}

impl ThumbCachePolicy {
    pub fn header_value(&self) -> &'static str {
        match self {
            ThumbCachePolicy::NoStore => "no-cache, no-store, must-revalidate",
            ThumbCachePolicy::PublicDay => "public, max-age=86400",
        }
    }

    fn from_env_value(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "public-day" | "public" => ThumbCachePolicy::PublicDay,
            _ => ThumbCachePolicy::NoStore,
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second (per IP)
    pub rate_limit_rps: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Public base URL advertised by `/api/config`
    pub public_base_url: String,
    /// Base of constructed embed URLs, e.g. `https://doodstream.com`
    pub embed_base: String,
    /// Cache directive for served thumbnails
    pub thumb_cache_policy: ThumbCachePolicy,
    /// Hostname fragments of known upstream image CDNs
    pub thumb_allowed_domains: Vec<String>,
    /// Reject (rather than warn on) non-allow-listed thumbnail hosts
    pub allowlist_enforced: bool,
    /// Timeout for proxied image fetches
    pub thumb_fetch_timeout: Duration,
    /// Redirect cap for proxied image fetches
    pub thumb_max_redirects: usize,
    /// Upstream JSON API configuration
    pub upstream: UpstreamConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 20,
            max_body_size: 1024 * 1024, // 1MB; this API accepts no uploads
            environment: "development".to_string(),
            public_base_url: "http://localhost:5000".to_string(),
            embed_base: "https://doodstream.com".to_string(),
            thumb_cache_policy: ThumbCachePolicy::NoStore,
            thumb_allowed_domains: vec![
                "postercdn.net".to_string(),
                "doodcdn.com".to_string(),
                "doodcdn.co".to_string(),
                "img.doodcdn.co".to_string(),
            ],
            allowlist_enforced: false,
            thumb_fetch_timeout: Duration::from_secs(30),
            thumb_max_redirects: 10,
            upstream: UpstreamConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let upstream_defaults = UpstreamConfig::default();

        Self {
            host: env_or("API_HOST", defaults.host),
            port: env_parse("API_PORT", defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: env_parse("RATE_LIMIT_RPS", defaults.rate_limit_rps),
            max_body_size: env_parse("MAX_BODY_SIZE", defaults.max_body_size),
            environment: env_or("ENVIRONMENT", defaults.environment),
            public_base_url: env_or("PUBLIC_BASE_URL", defaults.public_base_url),
            embed_base: env_or("EMBED_BASE", defaults.embed_base),
            thumb_cache_policy: std::env::var("THUMB_CACHE_POLICY")
                .map(|v| ThumbCachePolicy::from_env_value(&v))
                .unwrap_or(defaults.thumb_cache_policy),
            thumb_allowed_domains: std::env::var("THUMB_ALLOWED_DOMAINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.thumb_allowed_domains),
            allowlist_enforced: std::env::var("ALLOWLIST_ENFORCED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.allowlist_enforced),
            thumb_fetch_timeout: Duration::from_secs(env_parse(
                "THUMB_FETCH_TIMEOUT",
                defaults.thumb_fetch_timeout.as_secs(),
            )),
            thumb_max_redirects: env_parse("THUMB_MAX_REDIRECTS", defaults.thumb_max_redirects),
            upstream: UpstreamConfig {
                api_base: env_or("UPSTREAM_API_BASE", upstream_defaults.api_base),
                img_api_base: env_or("UPSTREAM_IMG_API_BASE", upstream_defaults.img_api_base),
                referer: env_or("UPSTREAM_REFERER", upstream_defaults.referer),
                api_key: std::env::var("DOODSTREAM_API_KEY").unwrap_or_default(),
                ..upstream_defaults
            },
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_policy_parsing() {
        assert_eq!(
            ThumbCachePolicy::from_env_value("public-day"),
            ThumbCachePolicy::PublicDay
        );
        assert_eq!(
            ThumbCachePolicy::from_env_value("no-store"),
            ThumbCachePolicy::NoStore
        );
        // Unknown values fall back to the conservative default.
        assert_eq!(
            ThumbCachePolicy::from_env_value("whatever"),
            ThumbCachePolicy::NoStore
        );
    }

    #[test]
    fn cache_policy_headers() {
        assert!(ThumbCachePolicy::NoStore.header_value().contains("no-store"));
        assert!(ThumbCachePolicy::PublicDay
            .header_value()
            .contains("max-age=86400"));
    }
}
