//! Subcommand implementations.

pub mod migrate;
pub mod seed;

use liahna_admin::config::ConfigError;
use liahna_admin::db::RepositoryError;

/// Errors surfaced by any CLI command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Session store error: {0}")]
    Sessions(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Bundled products are invalid: {0}")]
    Fixtures(#[from] serde_json::Error),
}
