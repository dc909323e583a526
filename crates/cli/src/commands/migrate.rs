//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ximy-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migration files live in `crates/storefront/migrations/` and are embedded at
//! compile time.

use super::{CommandError, connect};

/// Run storefront database migrations.
pub async fn storefront() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
