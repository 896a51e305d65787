//! Upstream file metadata models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Minimum accepted file code length.
const MIN_CODE_LEN: usize = 4;
/// Maximum accepted file code length.
const MAX_CODE_LEN: usize = 64;

/// Error returned when a string is not a well-formed file code.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid file code: {0:?}")]
pub struct FileCodeError(pub String);

/// The upstream host's opaque identifier for a video asset.
///
/// Codes are validated on construction so path parameters can never smuggle
/// separators or query syntax into outbound upstream URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FileCode(String);

impl FileCode {
    /// Parse and validate a file code.
    ///
    /// Valid format: ASCII alphanumeric, `-` or `_`, 4-64 chars.
    pub fn parse(s: impl Into<String>) -> Result<Self, FileCodeError> {
        let s = s.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(FileCodeError(s))
        }
    }

    /// Check whether a string is a well-formed file code.
    pub fn is_valid(s: &str) -> bool {
        if s.len() < MIN_CODE_LEN || s.len() > MAX_CODE_LEN {
            return false;
        }
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for FileCode {
    type Error = FileCodeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

/// One entry from the upstream file listing.
///
/// The upstream omits fields freely depending on endpoint and file age, so
/// everything except the code defaults when missing. Unknown fields are kept
/// out; the API layer forwards the raw envelope where full fidelity matters.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileRecord {
    pub file_code: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub views: u64,

    /// Duration in seconds. Some upstream responses call this `length`.
    #[serde(default, alias = "length")]
    pub duration: f64,

    /// Upload timestamp as reported by the upstream (opaque string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<String>,

    /// Small per-video thumbnail (the resolver's fallback tier).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_img: Option<String>,

    /// Larger splash image (the resolver's primary tier).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splash_img: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes_parse() {
        assert!(FileCode::parse("abcd1234").is_ok());
        assert!(FileCode::parse("a-b_c-d9").is_ok());
        assert!(FileCode::parse("wxyz").is_ok());
    }

    #[test]
    fn invalid_codes_rejected() {
        assert!(FileCode::parse("").is_err());
        assert!(FileCode::parse("abc").is_err());
        assert!(FileCode::parse("abcd/..").is_err());
        assert!(FileCode::parse("abcd?key=x").is_err());
        assert!(FileCode::parse("a".repeat(65)).is_err());
    }

    #[test]
    fn file_record_tolerates_missing_fields() {
        let record: FileRecord =
            serde_json::from_str(r#"{"file_code":"abc123xy"}"#).unwrap();
        assert_eq!(record.file_code, "abc123xy");
        assert_eq!(record.views, 0);
        assert!(record.single_img.is_none());
    }

    #[test]
    fn file_record_accepts_length_alias() {
        let record: FileRecord =
            serde_json::from_str(r#"{"file_code":"abc123xy","length":95.0}"#).unwrap();
        assert_eq!(record.duration, 95.0);
    }
}
