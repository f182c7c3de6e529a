use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use mirage_client::{AnyProvider, GeminiProvider};
use mirage_db::{Database, DatabaseConfig};
use mirage_server::routes;
use mirage_server::state::AppState;

/// Router plus the temp dir that keeps the SQLite file alive for the
/// duration of the test.
pub struct TestApp {
    pub router: Router,
    pub db: Database,
    _dir: TempDir,
}

/// Build a test app backed by a throwaway SQLite file. The provider
/// carries a dummy key; tests that exercise it never reach the network.
pub async fn setup_test_app() -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = DatabaseConfig::with_path(dir.path().join("test.db"));

    let db = Database::connect(&config)
        .await
        .expect("Failed to open test database");
    db.migrate().await.expect("Failed to run migrations");

    let provider = AnyProvider::Gemini(
        GeminiProvider::new("test-key", None).expect("Failed to build provider"),
    );

    let state = Arc::new(AppState {
        db: db.clone(),
        provider,
    });

    TestApp {
        router: routes::router(state),
        db,
        _dir: dir,
    }
}
