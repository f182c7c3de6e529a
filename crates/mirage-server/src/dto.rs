use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mirage_core::models::{CloneRecord, CloneSummary};

// ---------------------------------------------------------------------------
// Clone
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CloneRequest {
    /// Absolute http/https URL of the site to clone
    pub url: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CloneMetadata {
    pub id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub filename: String,
}

impl From<&CloneRecord> for CloneMetadata {
    fn from(record: &CloneRecord) -> Self {
        Self {
            id: record.id,
            url: record.url.clone(),
            created_at: record.created_at,
            filename: record.filename.clone(),
        }
    }
}

impl From<CloneSummary> for CloneMetadata {
    fn from(summary: CloneSummary) -> Self {
        Self {
            id: summary.id,
            url: summary.url,
            created_at: summary.created_at,
            filename: summary.filename,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CloneResponse {
    /// The reconstructed, self-contained HTML document
    pub html: String,
    pub metadata: CloneMetadata,
    /// Set when the clone succeeded but could not be saved to history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// ---------------------------------------------------------------------------
// History & preview
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HistoryResponse {
    pub clones: Vec<CloneMetadata>,
    pub total: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PreviewResponse {
    pub html: String,
}

// ---------------------------------------------------------------------------
// Health & errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
