//! Catalog-wide counts for the seller's dashboard.

use sqlx::{FromRow, PgPool};

use super::RepositoryError;

/// Aggregate counts across the catalog and its analytics tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct CatalogStats {
    pub total_items: i64,
    pub available_items: i64,
    /// Sold online or offline.
    pub sold_items: i64,
    pub item_views: i64,
    pub whatsapp_clicks: i64,
}

/// Read-only access to dashboard counts.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new stats repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All five counts in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn catalog(&self) -> Result<CatalogStats, RepositoryError> {
        let stats = sqlx::query_as::<_, CatalogStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM items) AS total_items,
                (SELECT COUNT(*) FROM items WHERE status = 'available') AS available_items,
                (SELECT COUNT(*) FROM items WHERE status IN ('sold', 'offline_sold')) AS sold_items,
                (SELECT COUNT(*) FROM analytics_item_views) AS item_views,
                (SELECT COUNT(*) FROM whatsapp_clicks) AS whatsapp_clicks
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
