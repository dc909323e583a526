//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `items` - Catalog items (one piece each, `available` until sold)
//! - `item_images` - Item photos, one flagged primary
//! - `whatsapp_clicks` - Inquiry button clicks
//! - `analytics_item_views` - Detail page views
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p ximy-cli -- migrate
//! ```

pub mod clicks;
pub mod items;
pub mod stats;
pub mod views;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use clicks::ClickRepository;
pub use items::{Item, ItemRepository, NewItem};
pub use stats::{CatalogStats, StatsRepository};
pub use views::ViewRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map an insert that references `items` by ID: a foreign key violation
    /// means the item does not exist.
    pub(crate) fn from_item_reference(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_foreign_key_violation()
        {
            return Self::NotFound;
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
