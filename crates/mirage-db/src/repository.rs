use chrono::{DateTime, Utc};
use mirage_core::error::AppError;
use mirage_core::models::{CloneRecord, CloneSummary};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for clone record persistence in SQLite.
///
/// Records are append-only: there is no update or delete path, matching
/// the immutability contract of [`CloneRecord`].
#[derive(Clone)]
pub struct CloneRepository {
    pool: SqlitePool,
}

impl CloneRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a new clone record.
    ///
    /// A filename collision surfaces as [`AppError::DuplicateFilename`];
    /// the existing record is never overwritten.
    pub async fn append(&self, record: &CloneRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO clones (id, url, created_at, filename, content_hash, html)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.url)
        .bind(record.created_at)
        .bind(&record.filename)
        .bind(&record.content_hash)
        .bind(&record.html)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateFilename(record.filename.clone())
            }
            _ => AppError::DatabaseError(e.to_string()),
        })?;

        tracing::debug!(filename = %record.filename, "clone record appended");
        Ok(())
    }

    /// List clone summaries, newest first.
    ///
    /// The filename tie-break keeps the order deterministic for records
    /// created within the same timestamp granularity.
    pub async fn list(&self) -> Result<Vec<CloneSummary>, AppError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT id, url, created_at, filename
            FROM clones
            ORDER BY created_at DESC, filename DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Point lookup by filename.
    pub async fn get_by_filename(&self, filename: &str) -> Result<Option<CloneRecord>, AppError> {
        let row = sqlx::query_as::<_, CloneRow>(
            r#"
            SELECT id, url, created_at, filename, content_hash, html
            FROM clones
            WHERE filename = ?1
            "#,
        )
        .bind(filename)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CloneRow {
    id: String,
    url: String,
    created_at: DateTime<Utc>,
    filename: String,
    content_hash: String,
    html: String,
}

impl TryFrom<CloneRow> for CloneRecord {
    type Error = AppError;

    fn try_from(row: CloneRow) -> Result<Self, AppError> {
        Ok(CloneRecord {
            id: parse_id(&row.id)?,
            url: row.url,
            created_at: row.created_at,
            filename: row.filename,
            content_hash: row.content_hash,
            html: row.html,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: String,
    url: String,
    created_at: DateTime<Utc>,
    filename: String,
}

impl TryFrom<SummaryRow> for CloneSummary {
    type Error = AppError;

    fn try_from(row: SummaryRow) -> Result<Self, AppError> {
        Ok(CloneSummary {
            id: parse_id(&row.id)?,
            url: row.url,
            created_at: row.created_at,
            filename: row.filename,
        })
    }
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|e| AppError::DatabaseError(format!("Corrupt record id '{raw}': {e}")))
}

// -- Trait implementation --

impl mirage_core::traits::CloneStore for CloneRepository {
    async fn append(&self, record: &CloneRecord) -> Result<(), AppError> {
        CloneRepository::append(self, record).await
    }

    async fn list(&self) -> Result<Vec<CloneSummary>, AppError> {
        CloneRepository::list(self).await
    }

    async fn get_by_filename(&self, filename: &str) -> Result<Option<CloneRecord>, AppError> {
        CloneRepository::get_by_filename(self, filename).await
    }
}
