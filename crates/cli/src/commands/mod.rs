//! Command implementations.

pub mod cart;
pub mod item;
pub mod migrate;
pub mod seed;
pub mod stats;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use ximy_storefront::db::{self, RepositoryError};

/// Errors shared by the database-backed commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Input rejected before touching the database.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Connect to the storefront database named by `STOREFRONT_DATABASE_URL`
/// (or `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url).await?)
}
