use mirage_core::error::AppError;
use mirage_core::traits::Provider;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_LLM_TIMEOUT, map_send_error, map_status_error};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Google Gemini backend via the `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiProvider {
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

// ---- Gemini API types ----

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull the generated text out of a `generateContent` response body.
fn decode_envelope(body: &str) -> Result<String, AppError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AppError::HttpError(format!("Failed to parse Gemini response: {e}")))?;

    let text: String = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        return Err(AppError::LlmError {
            message: "Empty response from Gemini".into(),
            status_code: 200,
            retryable: false,
        });
    }
    Ok(text)
}

impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn invoke(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{BASE_URL}/models/{}:generateContent", self.model);

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
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
            .map_err(|e| AppError::HttpError(format!("Failed to read Gemini response: {e}")))?;
        decode_envelope(&body)
    }
}
