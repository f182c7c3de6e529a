use mirage_core::error::AppError;
use mirage_core::traits::Provider;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_LLM_TIMEOUT, map_send_error, map_status_error};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI backend via the chat completions API.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiProvider {
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

// ---- OpenAI API types ----

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull the generated text out of a chat completions response body.
fn decode_envelope(body: &str) -> Result<String, AppError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AppError::HttpError(format!("Failed to parse OpenAI response: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| AppError::LlmError {
            message: "Empty response from OpenAI".into(),
            status_code: 200,
            retryable: false,
        })
}

impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, AppError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
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
            .map_err(|e| AppError::HttpError(format!("Failed to read OpenAI response: {e}")))?;
        decode_envelope(&body)
    }
}
