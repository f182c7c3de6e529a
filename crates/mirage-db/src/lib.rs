//! SQLite artifact store for Mirage clone records.

pub mod config;
pub mod database;
pub mod repository;

pub use config::DatabaseConfig;
pub use database::Database;
pub use repository::CloneRepository;
