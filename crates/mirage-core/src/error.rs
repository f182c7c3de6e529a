use thiserror::Error;

/// Application-wide error types for Mirage.
///
/// One variant per distinct failure condition in the clone pipeline, so
/// callers can react to the cause without string matching.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request URL is not an absolute http/https URL. Rejected before any I/O.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network/connection error while fetching.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Target site answered with a non-success HTTP status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Target site returned something other than an HTML document.
    #[error("Unsupported content type '{0}' (expected HTML)")]
    UnsupportedContentType(String),

    /// Redirect chain exceeded the hop limit.
    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(u32),

    /// Response body exceeded the payload cap.
    #[error("Payload too large (limit {limit_bytes} bytes)")]
    PayloadTooLarge { limit_bytes: usize },

    /// Generic HTTP-layer failure (malformed response, client build, ...).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The fetched document yielded no usable structural content.
    #[error("Distillation error: {0}")]
    DistillError(String),

    /// Credential for the configured provider is missing.
    #[error("Missing API key: {0} is not set")]
    MissingApiKey(String),

    /// Provider rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// LLM backend reported an error.
    #[error("LLM error (HTTP {status_code}): {message}")]
    LlmError {
        message: String,
        status_code: u16,
        retryable: bool,
    },

    /// Model output contained no recognizable HTML document.
    #[error("Unparseable LLM response: {0}")]
    UnparseableResponse(String),

    /// A record with the same filename already exists.
    #[error("Duplicate filename: {0}")]
    DuplicateFilename(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::RateLimitExceeded => true,
            AppError::LlmError { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

/// Pipeline stage in which a clone request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validate,
    Fetch,
    Distill,
    Synthesize,
    Persist,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineStage::Validate => "validate",
            PipelineStage::Fetch => "fetch",
            PipelineStage::Distill => "distill",
            PipelineStage::Synthesize => "synthesize",
            PipelineStage::Persist => "persist",
        };
        f.write_str(s)
    }
}

/// A pipeline failure tagged with the stage that produced it.
///
/// The clone state machine is linear (validate → fetch → distill →
/// synthesize → persist); the first failing stage short-circuits the run.
#[derive(Error, Debug)]
#[error("clone pipeline failed at {stage}: {source}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    #[source]
    pub source: AppError,
}

impl PipelineError {
    pub fn new(stage: PipelineStage, source: AppError) -> Self {
        Self { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(AppError::NetworkError("reset".into()).is_retryable());
        assert!(AppError::Timeout(30).is_retryable());
        assert!(AppError::RateLimitExceeded.is_retryable());
        assert!(
            AppError::LlmError {
                message: "server error".into(),
                status_code: 500,
                retryable: true,
            }
            .is_retryable()
        );
        assert!(!AppError::DistillError("empty page".into()).is_retryable());
        assert!(!AppError::InvalidUrl("ftp://x".into()).is_retryable());
    }

    #[test]
    fn test_pipeline_error_display_includes_stage() {
        let err = PipelineError::new(
            PipelineStage::Fetch,
            AppError::NetworkError("connection refused".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("fetch"));
        assert!(msg.contains("connection refused"));
    }
}
