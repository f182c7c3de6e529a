//! Concrete LLM backends behind a single [`Provider`] capability set.
//!
//! Each backend owns its wire shape in `invoke`; prompt construction and
//! document extraction come from the shared defaults in `mirage-core`.
//! The set is closed by design: [`AnyProvider`] enumerates the supported
//! backends, and the choice is resolved once at process start from
//! [`ProviderConfig`], never per request.

use std::time::Duration;

use mirage_core::error::AppError;
use mirage_core::traits::Provider;

mod claude;
mod gemini;
mod openai;

pub use claude::ClaudeProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// Timeout for provider calls, independent of the fetch timeout.
pub(crate) const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(120);

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Claude,
    OpenAi,
}

impl ProviderKind {
    /// Environment variable holding this backend's credential.
    pub fn key_env(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Claude => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(AppError::ConfigError(format!(
                "unsupported provider '{other}' (expected gemini, claude, or openai)"
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::Claude => "claude",
            ProviderKind::OpenAi => "openai",
        };
        f.write_str(s)
    }
}

/// Provider selection and credential, resolved once at process start.
///
/// - `MIRAGE_PROVIDER` — gemini (default), claude, or openai
/// - `GEMINI_API_KEY` / `ANTHROPIC_API_KEY` / `OPENAI_API_KEY` — one
///   credential for the chosen backend
/// - `MIRAGE_MODEL` — optional model override
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: Option<String>,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let kind: ProviderKind = std::env::var("MIRAGE_PROVIDER")
            .unwrap_or_else(|_| "gemini".to_string())
            .parse()?;

        let api_key = std::env::var(kind.key_env())
            .map_err(|_| AppError::MissingApiKey(kind.key_env().to_string()))?;

        let model = std::env::var("MIRAGE_MODEL").ok().filter(|m| !m.is_empty());

        Ok(Self {
            kind,
            api_key,
            model,
        })
    }
}

/// The closed set of configured backends, selected once at startup.
#[derive(Clone)]
pub enum AnyProvider {
    Gemini(GeminiProvider),
    Claude(ClaudeProvider),
    OpenAi(OpenAiProvider),
}

impl AnyProvider {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, AppError> {
        let model = config.model.as_deref();
        Ok(match config.kind {
            ProviderKind::Gemini => {
                AnyProvider::Gemini(GeminiProvider::new(&config.api_key, model)?)
            }
            ProviderKind::Claude => {
                AnyProvider::Claude(ClaudeProvider::new(&config.api_key, model)?)
            }
            ProviderKind::OpenAi => {
                AnyProvider::OpenAi(OpenAiProvider::new(&config.api_key, model)?)
            }
        })
    }
}

impl Provider for AnyProvider {
    fn name(&self) -> &'static str {
        match self {
            AnyProvider::Gemini(p) => p.name(),
            AnyProvider::Claude(p) => p.name(),
            AnyProvider::OpenAi(p) => p.name(),
        }
    }

    async fn invoke(&self, prompt: &str) -> Result<String, AppError> {
        match self {
            AnyProvider::Gemini(p) => p.invoke(prompt).await,
            AnyProvider::Claude(p) => p.invoke(prompt).await,
            AnyProvider::OpenAi(p) => p.invoke(prompt).await,
        }
    }
}

/// Shared reqwest error mapping for provider calls.
pub(crate) fn map_send_error(e: reqwest::Error, timeout_secs: u64) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout_secs)
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {e}"))
    } else {
        AppError::HttpError(e.to_string())
    }
}

/// Shared non-success status mapping for provider calls.
pub(crate) fn map_status_error(status_code: u16, message: String) -> AppError {
    if status_code == 429 {
        return AppError::RateLimitExceeded;
    }
    AppError::LlmError {
        message,
        status_code,
        retryable: status_code >= 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("Claude".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
        assert_eq!("anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Claude);
        assert_eq!("OPENAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert!(matches!(
            "llama".parse::<ProviderKind>(),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            map_status_error(429, "slow down".into()),
            AppError::RateLimitExceeded
        ));
        assert!(matches!(
            map_status_error(503, "overloaded".into()),
            AppError::LlmError {
                retryable: true,
                ..
            }
        ));
        assert!(matches!(
            map_status_error(401, "bad key".into()),
            AppError::LlmError {
                retryable: false,
                ..
            }
        ));
    }
}
