//! Cart entry snapshot type.

use serde::{Deserialize, Serialize};

use super::{ItemId, Price, Slug};

/// One item a visitor intends to inquire about.
///
/// Everything except `id` is a snapshot taken when the item was added and is
/// never re-fetched: the cart (and the checkout total) shows what the visitor
/// saw, even if the catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Catalog item this entry refers to.
    pub id: ItemId,
    /// Display title at add time.
    pub title: String,
    /// Price at add time.
    pub price: Price,
    /// Slug used to link back to the item detail page.
    pub slug: Slug,
    /// Primary image URL at add time, if the item had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartEntry {
    /// Create a cart entry without an image.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, price: Price, slug: Slug) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            slug,
            image_url: None,
        }
    }

    /// Attach a primary image URL.
    #[must_use]
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_url_deserializes_as_none() {
        let json = r#"{"id":"a","title":"Denim","price":"120","slug":"denim"}"#;
        let entry: CartEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, ItemId::new("a"));
        assert_eq!(entry.price, Price::from_ringgit(120));
        assert!(entry.image_url.is_none());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let json = r#"{"id":"a","title":"Denim","price":"120"}"#;
        assert!(serde_json::from_str::<CartEntry>(json).is_err());
    }
}
