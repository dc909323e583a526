//! Catalog item repository.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database. IDs are compared as text (`id::text`) so a
//! malformed ID from a visitor's cart simply matches nothing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use ximy_core::{ItemAvailability, ItemId, ItemStatus, Price, Slug, SlugError};

use super::RepositoryError;

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Price,
    pub status: ItemStatus,
    pub offline_location: Option<String>,
    pub primary_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`ItemRepository::create`].
///
/// Constructed through [`NewItem::new`], which rejects titles that yield no
/// usable slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    title: String,
    base_slug: Slug,
    pub price: Price,
    pub status: ItemStatus,
    pub description: Option<String>,
    pub offline_location: Option<String>,
    /// Image URLs in display order; the first is the primary image.
    pub image_urls: Vec<String>,
}

impl NewItem {
    /// Create an available item with no description or images.
    ///
    /// # Errors
    ///
    /// Returns `SlugError::Empty` if the title has no ASCII letters or digits.
    pub fn new(title: impl Into<String>, price: Price) -> Result<Self, SlugError> {
        let title = title.into().trim().to_owned();
        let base_slug = Slug::from_title(&title)?;
        Ok(Self {
            title,
            base_slug,
            price,
            status: ItemStatus::Available,
            description: None,
            offline_location: None,
            image_urls: Vec::new(),
        })
    }

    /// The item title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Slug derived from the title, before de-duplication.
    #[must_use]
    pub const fn base_slug(&self) -> &Slug {
        &self.base_slug
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    title: String,
    slug: String,
    description: Option<String>,
    price: Decimal,
    status: String,
    offline_location: Option<String>,
    primary_image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_status(&row.id, &row.status)?,
            id: ItemId::new(row.id),
            title: row.title,
            slug: Slug::from_stored(row.slug),
            description: row.description,
            price: Price::new(row.price),
            offline_location: row.offline_location,
            primary_image_url: row.primary_image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_status(id: &str, status: &str) -> Result<ItemStatus, RepositoryError> {
    status.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid status for item {id}: {e}"))
    })
}

const ITEM_COLUMNS: &str = r"
    i.id::text AS id, i.title, i.slug, i.description, i.price, i.status,
    i.offline_location, i.created_at, i.updated_at,
    (SELECT image_url FROM item_images
     WHERE item_id = i.id
     ORDER BY is_primary DESC, display_order
     LIMIT 1) AS primary_image_url
";

/// Repository for catalog item database operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up the status of every item in `ids` with a single query.
    ///
    /// IDs with no matching row are absent from the result. Order is
    /// unspecified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row has an unknown status.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn availability(
        &self,
        ids: &[ItemId],
    ) -> Result<Vec<ItemAvailability>, RepositoryError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r"
            SELECT id::text, status
            FROM items
            WHERE id::text = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, status)| {
                Ok(ItemAvailability {
                    status: parse_status(&id, &status)?,
                    id: ItemId::new(id),
                })
            })
            .collect()
    }

    /// Get an item by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row has an unknown status.
    pub async fn get_by_id(&self, id: &ItemId) -> Result<Option<Item>, RepositoryError> {
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items i WHERE i.id::text = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Item::try_from).transpose()
    }

    /// Get an item by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row has an unknown status.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Item>, RepositoryError> {
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items i WHERE i.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(Item::try_from).transpose()
    }

    /// Slugs already in use that could collide with `base` or one of its
    /// numbered variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn taken_slugs(&self, base: &Slug) -> Result<HashSet<String>, RepositoryError> {
        // Slugs are [a-z0-9-] only, so the pattern needs no escaping.
        let slugs: Vec<String> =
            sqlx::query_scalar("SELECT slug FROM items WHERE slug = $1 OR slug LIKE $2")
                .bind(base.as_str())
                .bind(format!("{base}-%"))
                .fetch_all(self.pool)
                .await?;

        Ok(slugs.into_iter().collect())
    }

    /// Create an item, giving it the first free slug among `base`, `base-2`,
    /// `base-3`, and so on.
    ///
    /// The item and its images are inserted in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if no free slug exists or a
    /// concurrent insert took the chosen one.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, item), fields(title = %item.title()))]
    pub async fn create(&self, item: &NewItem) -> Result<Item, RepositoryError> {
        let taken = self.taken_slugs(item.base_slug()).await?;
        let slug = item
            .base_slug()
            .unique(|candidate| taken.contains(candidate.as_str()))
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        let row: ItemRow = sqlx::query_as(
            r"
            INSERT INTO items (title, slug, description, price, status, offline_location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id::text AS id, title, slug, description, price, status,
                      offline_location, NULL::text AS primary_image_url,
                      created_at, updated_at
            ",
        )
        .bind(item.title())
        .bind(slug.as_str())
        .bind(item.description.as_deref())
        .bind(item.price.amount())
        .bind(item.status.as_str())
        .bind(item.offline_location.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("slug '{slug}' already exists"));
            }
            RepositoryError::Database(e)
        })?;

        for (position, url) in item.image_urls.iter().enumerate() {
            let display_order = i32::try_from(position).map_err(|_| {
                RepositoryError::Conflict("too many images for one item".to_owned())
            })?;
            sqlx::query(
                r"
                INSERT INTO item_images (item_id, image_url, is_primary, display_order)
                VALUES ($1::uuid, $2, $3, $4)
                ",
            )
            .bind(&row.id)
            .bind(url)
            .bind(position == 0)
            .bind(display_order)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let mut created = Item::try_from(row)?;
        created.primary_image_url = item.image_urls.first().cloned();
        tracing::info!(item_id = %created.id, slug = %created.slug, "item created");
        Ok(created)
    }

    /// Change an item's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(item_id = %id, status = %status))]
    pub async fn set_status(&self, id: &ItemId, status: ItemStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE items
            SET status = $2, updated_at = NOW()
            WHERE id::text = $1
            ",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an item and its images.
    ///
    /// Click and view rows keep their history with the item reference
    /// cleared. A deleted item is absent from every later availability check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn delete(&self, id: &ItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id::text = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!("item deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(status: &str) -> ItemRow {
        ItemRow {
            id: "0b7c6f1e-8d0a-4c55-9a51-2f1f6d3c9e11".to_owned(),
            title: "Levi's 501 Denim Jacket".to_owned(),
            slug: "levi-s-501-denim-jacket".to_owned(),
            description: None,
            price: Decimal::new(12000, 2),
            status: status.to_owned(),
            offline_location: None,
            primary_image_url: Some("https://cdn.ximy.my/jacket.jpg".to_owned()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_item() {
        let item = Item::try_from(row("offline_sold")).unwrap();
        assert_eq!(item.status, ItemStatus::OfflineSold);
        assert_eq!(item.price, Price::from_ringgit(120));
        assert_eq!(item.slug.as_str(), "levi-s-501-denim-jacket");
        assert_eq!(
            item.primary_image_url.as_deref(),
            Some("https://cdn.ximy.my/jacket.jpg")
        );
    }

    #[test]
    fn test_unknown_status_is_data_corruption() {
        let err = Item::try_from(row("reserved")).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_new_item_derives_slug_from_trimmed_title() {
        let item = NewItem::new("  Vintage Band Tee (1994)  ", Price::from_ringgit(80)).unwrap();
        assert_eq!(item.title(), "Vintage Band Tee (1994)");
        assert_eq!(item.base_slug().as_str(), "vintage-band-tee-1994");
        assert_eq!(item.status, ItemStatus::Available);
    }

    #[test]
    fn test_new_item_rejects_unsluggable_title() {
        assert!(NewItem::new("!!!", Price::from_ringgit(10)).is_err());
    }
}
