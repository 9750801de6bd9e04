//! CLI subcommands.

pub mod migrate;
pub mod sync;

use secrecy::SecretString;

/// Errors shared by commands that need the database.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(#[from] combo_offers_server::config::ConfigError),

    #[error("Shopify error: {0}")]
    Shopify(#[from] combo_offers_server::shopify::ShopifyError),

    #[error("Sync failed: {0}")]
    Sync(#[from] combo_offers_server::error::AppError),
}

/// Read `DATABASE_URL`, loading `.env` first.
pub fn database_url() -> Result<SecretString, CommandError> {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))
}
