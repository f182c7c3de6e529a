use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use mirage_client::{ReqwestFetcher, ScraperDistiller};
use mirage_core::CloneService;

use crate::dto::{
    CloneMetadata, CloneRequest, CloneResponse, ErrorResponse, HealthResponse, HistoryResponse,
    PreviewResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/clone", post(clone_site))
        .route("/history", get(history))
        .route("/preview/{filename}", get(preview))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Clone
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/clone",
    request_body = CloneRequest,
    responses(
        (status = 200, description = "Synthesized clone", body = CloneResponse),
        (status = 400, description = "Invalid URL", body = ErrorResponse),
        (status = 422, description = "Site content unusable", body = ErrorResponse),
        (status = 502, description = "Fetch or synthesis failed", body = ErrorResponse),
    ),
    tag = "clone"
)]
pub async fn clone_site(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<CloneRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let fetcher = ReqwestFetcher::new()?;
    let distiller = ScraperDistiller::new();
    let service = CloneService::new(
        fetcher,
        distiller,
        state.provider.clone(),
        state.db.clone_repo(),
    );

    let outcome = service.clone_site(&body.url).await?;

    let response = CloneResponse {
        metadata: CloneMetadata::from(&outcome.record),
        warning: outcome
            .store_warning
            .map(|w| format!("Clone succeeded but was not saved to history: {w}")),
        html: outcome.result.html,
    };

    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "Clone history, newest first", body = HistoryResponse),
    ),
    tag = "history"
)]
pub async fn history(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let summaries = state.db.clone_repo().list().await?;
    let total = summaries.len();

    let response = HistoryResponse {
        clones: summaries.into_iter().map(CloneMetadata::from).collect(),
        total,
    };

    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/preview/{filename}",
    params(
        ("filename" = String, Path, description = "Clone record filename")
    ),
    responses(
        (status = 200, description = "Stored clone document", body = PreviewResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    ),
    tag = "preview"
)]
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.db.clone_repo().get_by_filename(&filename).await?;

    match record {
        Some(record) => {
            Ok(axum::Json(PreviewResponse { html: record.html }).into_response())
        }
        None => {
            let body = ErrorResponse {
                error: "not_found".to_string(),
                message: format!("No clone found for filename: {filename}"),
            };
            Ok((StatusCode::NOT_FOUND, axum::Json(body)).into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.db.clone_repo().health_check().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };

    let status = if db_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if db_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        database: db_status,
    };

    (status, axum::Json(response))
}
