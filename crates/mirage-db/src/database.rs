use mirage_core::AppError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::repository::CloneRepository;

/// Schema, applied idempotently at startup. The store is a single table;
/// the UNIQUE constraint on `filename` is what makes duplicate appends a
/// hard error instead of a silent overwrite.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS clones (
    id           TEXT PRIMARY KEY,
    url          TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    filename     TEXT NOT NULL UNIQUE,
    content_hash TEXT NOT NULL,
    html         TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_clones_created_at ON clones(created_at);
"#;

/// Central database facade — owns the connection pool, applies the schema,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the SQLite database at the configured path.
    ///
    /// WAL mode so history reads can run concurrently with appends.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply the schema. Safe to call on every start.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get a [`CloneRepository`] backed by this pool.
    pub fn clone_repo(&self) -> CloneRepository {
        CloneRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
