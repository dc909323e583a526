//! WhatsApp inquiry click tracking.

use sqlx::PgPool;
use tracing::instrument;

use ximy_core::{ItemId, VisitorId};

use super::RepositoryError;

/// Repository for the `whatsapp_clicks` table.
pub struct ClickRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClickRepository<'a> {
    /// Create a new click repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record that `visitor` pressed the inquiry button for `item`.
    ///
    /// `item` must be a UUID; callers validate it before recording.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(item_id = %item, visitor_id = %visitor))]
    pub async fn record(&self, item: &ItemId, visitor: &VisitorId) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO whatsapp_clicks (item_id, visitor_id) VALUES ($1::uuid, $2)")
            .bind(item)
            .bind(visitor)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_item_reference)?;

        Ok(())
    }

    /// Number of clicks recorded for `item`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_item(&self, item: &ItemId) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM whatsapp_clicks WHERE item_id::text = $1")
                .bind(item)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }
}
