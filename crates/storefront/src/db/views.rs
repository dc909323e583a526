//! Item detail page view tracking.

use sqlx::PgPool;
use tracing::instrument;

use ximy_core::{ItemId, VisitorId};

use super::RepositoryError;

/// Repository for the `analytics_item_views` table.
pub struct ViewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ViewRepository<'a> {
    /// Create a new view repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record that `visitor` opened the detail page of `item`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(item_id = %item, visitor_id = %visitor))]
    pub async fn record(&self, item: &ItemId, visitor: &VisitorId) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO analytics_item_views (item_id, visitor_id) VALUES ($1::uuid, $2)")
            .bind(item)
            .bind(visitor)
            .execute(self.pool)
            .await
            .map_err(RepositoryError::from_item_reference)?;

        Ok(())
    }

    /// Number of views recorded for `item`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_item(&self, item: &ItemId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM analytics_item_views WHERE item_id::text = $1",
        )
        .bind(item)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }
}
