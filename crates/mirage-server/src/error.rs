use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use mirage_core::error::{AppError, PipelineError, PipelineStage};

use crate::dto::ErrorResponse;

/// Wrapper so pipeline and store failures can be turned into HTTP
/// responses, keeping the stage around for status selection.
pub struct ApiError {
    stage: Option<PipelineStage>,
    source: AppError,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self {
            stage: None,
            source: err,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self {
            stage: Some(err.stage),
            source: err.source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match (&self.stage, &self.source) {
            (_, AppError::InvalidUrl(_)) => (StatusCode::BAD_REQUEST, "validation_error"),
            (Some(PipelineStage::Fetch), AppError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "fetch_timeout")
            }
            (Some(PipelineStage::Fetch), _) => (StatusCode::BAD_GATEWAY, "fetch_error"),
            (Some(PipelineStage::Distill), _) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "distill_error")
            }
            (_, AppError::RateLimitExceeded) => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded")
            }
            (Some(PipelineStage::Synthesize), AppError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "synthesis_timeout")
            }
            (Some(PipelineStage::Synthesize), AppError::MissingApiKey(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error")
            }
            (Some(PipelineStage::Synthesize), _) => (StatusCode::BAD_GATEWAY, "synthesis_error"),
            (_, AppError::ConfigError(_) | AppError::MissingApiKey(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error")
            }
            (_, AppError::DatabaseError(_) | AppError::DuplicateFilename(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: user_message(self.stage, &self.source),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// User-facing message per stage; the specific cause rides along for
/// diagnostics.
fn user_message(stage: Option<PipelineStage>, source: &AppError) -> String {
    match stage {
        Some(PipelineStage::Fetch) => format!("Could not retrieve the site: {source}"),
        Some(PipelineStage::Distill) => format!("Site content is unusable: {source}"),
        Some(PipelineStage::Synthesize) => format!("Synthesis failed: {source}"),
        _ => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(AppError::InvalidUrl("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PipelineError::new(PipelineStage::Fetch, AppError::Timeout(30)).into()),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(
                PipelineError::new(
                    PipelineStage::Fetch,
                    AppError::HttpStatus {
                        status: 500,
                        url: "https://example.com".into()
                    }
                )
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(
                PipelineError::new(PipelineStage::Distill, AppError::DistillError("empty".into()))
                    .into()
            ),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(
                PipelineError::new(PipelineStage::Synthesize, AppError::RateLimitExceeded).into()
            ),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(AppError::DatabaseError("oops".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
