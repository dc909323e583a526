//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! items:
//!   - title: "Levi's 501 Denim Jacket"
//!     price: 120
//!     description: Made in USA, 1990s
//!     images:
//!       - https://cdn.ximy.my/jacket-front.jpg
//!   - title: Harley Davidson Tee
//!     price: "89.90"
//!     status: offline_sold
//!     offline_location: Bazaar Bangsar
//! ```
//!
//! The whole file is validated before the database is touched. Slugs are
//! derived from titles and de-duplicated, so seeding the same file twice
//! creates `-2` copies rather than failing.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use ximy_core::{ItemStatus, Price};
use ximy_storefront::db::{ItemRepository, NewItem};

use super::{CommandError, connect};

#[derive(Debug, Deserialize)]
struct SeedFile {
    items: Vec<SeedItem>,
}

#[derive(Debug, Deserialize)]
struct SeedItem {
    title: String,
    price: RawPrice,
    #[serde(default)]
    status: ItemStatus,
    description: Option<String>,
    offline_location: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

/// YAML prices may be written as numbers or strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Whole(i64),
    Fractional(f64),
    Text(String),
}

impl RawPrice {
    fn parse(&self) -> Result<Price, String> {
        let text = match self {
            Self::Whole(n) => n.to_string(),
            Self::Fractional(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        };
        Price::parse(&text).map_err(|e| e.to_string())
    }
}

/// Parse and validate a seed file, reporting every bad entry at once.
fn parse_seed(content: &str) -> Result<Vec<NewItem>, CommandError> {
    let file: SeedFile = serde_yaml::from_str(content)
        .map_err(|e| CommandError::InvalidInput(format!("invalid seed file: {e}")))?;

    let mut items = Vec::with_capacity(file.items.len());
    let mut errors = Vec::new();

    for (index, raw) in file.items.into_iter().enumerate() {
        let price = match raw.price.parse() {
            Ok(price) => price,
            Err(e) => {
                errors.push(format!("item {} ({}): {e}", index + 1, raw.title));
                continue;
            }
        };
        match NewItem::new(raw.title.as_str(), price) {
            Ok(mut item) => {
                item.status = raw.status;
                item.description = raw.description;
                item.offline_location = raw.offline_location;
                item.image_urls = raw.images;
                items.push(item);
            }
            Err(e) => errors.push(format!("item {} ({}): {e}", index + 1, raw.title)),
        }
    }

    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::InvalidInput(format!(
            "{} invalid items",
            errors.len()
        )));
    }

    Ok(items)
}

/// Insert every item in `file_path`.
pub async fn items(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog items from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CommandError::InvalidInput(format!("cannot read {file_path}: {e}")))?;
    let items = parse_seed(&content)?;
    info!(items = items.len(), "Seed file validated");

    let pool = connect().await?;
    let repo = ItemRepository::new(&pool);

    for item in &items {
        let created = repo.create(item).await?;
        info!(id = %created.id, slug = %created.slug, "  + {}", created.title);
    }

    info!("Seeding complete! {} items inserted", items.len());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_accepts_number_and_string_prices() {
        let items = parse_seed(
            r"
items:
  - title: Levi's 501 Denim Jacket
    price: 120
    images:
      - https://cdn.ximy.my/a.jpg
      - https://cdn.ximy.my/b.jpg
  - title: Harley Davidson Tee
    price: '89.90'
    status: offline_sold
    offline_location: Bazaar Bangsar
",
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].base_slug().as_str(), "levi-s-501-denim-jacket");
        assert_eq!(items[0].price, Price::from_ringgit(120));
        assert_eq!(items[0].image_urls.len(), 2);
        assert_eq!(items[0].status, ItemStatus::Available);
        assert_eq!(items[1].status, ItemStatus::OfflineSold);
        assert_eq!(items[1].price, Price::parse("89.90").unwrap());
    }

    #[test]
    fn test_parse_seed_rejects_bad_entries() {
        let err = parse_seed(
            r"
items:
  - title: '???'
    price: 10
  - title: Flannel Shirt
    price: -5
",
        )
        .unwrap_err();

        assert!(matches!(err, CommandError::InvalidInput(ref msg) if msg == "2 invalid items"));
    }
}
