use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use crate::error::AppError;

/// Raw document as returned by a [`Fetcher`](crate::traits::Fetcher).
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Document body (decoded text).
    pub body: String,
    /// URL the fetch actually resolved to, after redirects.
    pub final_url: String,
    /// Content type reported by the server.
    pub content_type: String,
}

/// One structural block extracted from the source page.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PageBlock {
    /// Source tag name (e.g., "h1", "p", "li", "img").
    pub tag: String,
    /// Collapsed-whitespace text content.
    pub text: String,
    /// Inline style declarations, if the element carried any.
    pub style: Option<String>,
}

/// Asset references discovered during distillation, used as styling hints.
///
/// All vectors are deterministically ordered (document order, de-duplicated)
/// and capped, so the same input page always produces the same hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AssetHints {
    pub images: Vec<String>,
    pub colors: Vec<String>,
    pub fonts: Vec<String>,
}

/// Compact structural representation of a fetched page.
///
/// Ephemeral: owned by the in-flight clone request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DistilledPage {
    pub title: Option<String>,
    pub blocks: Vec<PageBlock>,
    pub assets: AssetHints,
}

/// Output of one successful provider synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Complete, self-contained HTML document.
    pub html: String,
    /// Name of the backend that generated it.
    pub provider: String,
}

/// The immutable persisted result of one successful clone.
///
/// `filename` is the external lookup key; it is derived from `id` at
/// creation and never changes. Records are append-only.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CloneRecord {
    pub id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub filename: String,
    /// SHA-256 of `html`, for diagnostics and integrity checks.
    pub content_hash: String,
    pub html: String,
}

impl CloneRecord {
    /// Build a record for a freshly synthesized document.
    ///
    /// Mints the id, derives the filename from it, and stamps the current
    /// instant. The filename is collision-free without consulting the store.
    pub fn create(url: &str, html: String) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            url: url.to_string(),
            created_at: Utc::now(),
            filename: format!("{}.html", id.simple()),
            content_hash: compute_hash(&html),
            html,
        }
    }

    pub fn summary(&self) -> CloneSummary {
        CloneSummary {
            id: self.id,
            url: self.url.clone(),
            created_at: self.created_at,
            filename: self.filename.clone(),
        }
    }
}

/// History entry: record metadata without the HTML payload.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CloneSummary {
    pub id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub filename: String,
}

/// Validate a clone-request URL purely from the string.
///
/// Accepts absolute http/https URLs with a host. Runs before any network
/// I/O, so a bad URL never reaches the fetcher.
pub fn validate_url(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::InvalidUrl(format!(
                "scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(AppError::InvalidUrl(format!("{url}: missing host")));
    }

    Ok(())
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/path?q=1").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(AppError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("file:///etc/passwd"),
            Err(AppError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("javascript:alert(1)"),
            Err(AppError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_validate_url_rejects_relative_and_garbage() {
        assert!(validate_url("example.com").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_record_create_derives_filename_from_id() {
        let record = CloneRecord::create("https://example.com", "<html></html>".into());
        assert_eq!(record.filename, format!("{}.html", record.id.simple()));
        assert_eq!(record.content_hash, compute_hash("<html></html>"));
    }

    #[test]
    fn test_record_filenames_are_unique() {
        let a = CloneRecord::create("https://example.com", "<html></html>".into());
        let b = CloneRecord::create("https://example.com", "<html></html>".into());
        assert_ne!(a.filename, b.filename);
    }

    #[test]
    fn test_compute_hash_consistency() {
        let h1 = compute_hash("hello world");
        let h2 = compute_hash("hello world");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(compute_hash("hello"), compute_hash("world"));
    }
}
