//! Thumbnail status and proxy outcome classification.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Byte-length ceiling below which an `image/*` response is assumed to be the
/// upstream's blank "still transcoding" placeholder rather than a real
/// thumbnail. Observed placeholders land around 560-1500 bytes; real
/// thumbnails start well above this.
///
/// This is a deliberate heuristic with false-positive risk for genuinely tiny
/// images; boundary behavior is pinned by tests.
pub const BLANK_IMAGE_BYTE_THRESHOLD: usize = 2500;

/// Thumbnail availability as reported by the upstream image API.
///
/// Polled by the resolver until `has_thumbnail` flips or the retry budget
/// runs out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ThumbnailStatus {
    pub has_thumbnail: bool,

    #[serde(default)]
    pub is_processing: bool,

    /// Preferred image URL (splash), when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,

    /// Secondary image URL (single frame), when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl ThumbnailStatus {
    /// The best URL to display, preferring the splash image.
    pub fn best_url(&self) -> Option<&str> {
        self.primary.as_deref().or(self.fallback.as_deref())
    }
}

/// Classification of one proxied thumbnail fetch.
///
/// Derived synchronously from a single upstream response; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyOutcome {
    /// Forward the body verbatim with the observed content type.
    Served {
        content_type: Option<String>,
        byte_length: usize,
    },
    /// The upstream has not finished generating the asset. Expected and
    /// recoverable; the client retries later.
    NotReady,
    /// The upstream failed or returned an unusable response.
    RemoteError,
}

/// Classify an upstream image response.
///
/// Rules, in order:
/// 1. upstream 403/404 means the asset is not accessible yet;
/// 2. an empty body is never a usable image;
/// 3. an `image/*` body under [`BLANK_IMAGE_BYTE_THRESHOLD`] is the blank
///    placeholder served while the real thumbnail is still transcoding;
/// 4. any other status >= 400 is an upstream error;
/// 5. everything else is forwarded.
pub fn classify_response(
    status: u16,
    content_type: Option<&str>,
    body_len: usize,
) -> ProxyOutcome {
    if status == 403 || status == 404 {
        return ProxyOutcome::NotReady;
    }
    if body_len == 0 {
        return ProxyOutcome::NotReady;
    }
    let is_image = content_type.is_some_and(|ct| ct.contains("image"));
    if is_image && body_len < BLANK_IMAGE_BYTE_THRESHOLD {
        return ProxyOutcome::NotReady;
    }
    if status >= 400 {
        return ProxyOutcome::RemoteError;
    }
    ProxyOutcome::Served {
        content_type: content_type.map(|ct| ct.to_string()),
        byte_length: body_len,
    }
}
