use mirage_core::error::AppError;
use mirage_core::traits::Provider;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_LLM_TIMEOUT, map_send_error, map_status_error};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
/// Generous output budget: full HTML documents are long.
const MAX_TOKENS: usize = 8192;

/// Anthropic Claude backend via the messages API.
#[derive(Clone)]
pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl ClaudeProvider {
    pub fn new(api_key: &str, model: Option<&str>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(DEFAULT_LLM_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            timeout_secs: DEFAULT_LLM_TIMEOUT.as_secs(),
        })
    }
}

// ---- Anthropic API types ----

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull the generated text out of a messages response body.
fn decode_envelope(body: &str) -> Result<String, AppError> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| AppError::HttpError(format!("Failed to parse Claude response: {e}")))?;

    let text: String = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        return Err(AppError::LlmError {
            message: "Empty response from Claude".into(),
            status_code: 200,
            retryable: false,
        });
    }
    Ok(text)
}

impl Provider for ClaudeProvider {
    fn name(&self) -> &'static str {
        "claude"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, AppError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status_code}: {body}"));
            return Err(map_status_error(status_code, message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read Claude response: {e}")))?;
        decode_envelope(&body)
    }
}
