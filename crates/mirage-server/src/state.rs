use mirage_client::AnyProvider;
use mirage_db::Database;

/// Shared application state, available to all route handlers via
/// `State<Arc<AppState>>`.
///
/// The provider is chosen once at process start; the core treats it as a
/// constant input, not a per-request parameter.
pub struct AppState {
    pub db: Database,
    pub provider: AnyProvider,
}
