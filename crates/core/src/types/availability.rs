//! Availability check types shared by the storefront API and the cart client.
//!
//! The wire format uses camelCase keys (`itemIds`, `validIds`) so existing
//! browser clients keep working.

use serde::{Deserialize, Serialize};

use super::{ItemId, ItemStatus};

/// One catalog row as seen by the availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAvailability {
    /// Catalog item ID.
    pub id: ItemId,
    /// Current status.
    pub status: ItemStatus,
}

/// Request body for `POST /api/cart/validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    /// Items to check. Duplicates are allowed.
    #[serde(default)]
    pub item_ids: Vec<ItemId>,
}

/// Response body for `POST /api/cart/validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    /// The subset of requested items that are currently purchasable.
    pub valid_ids: Vec<ItemId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_camel_case() {
        let req = ValidateRequest {
            item_ids: vec![ItemId::new("a"), ItemId::new("b")],
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"itemIds":["a","b"]}"#
        );

        let resp: ValidateResponse = serde_json::from_str(r#"{"validIds":["b"]}"#).unwrap();
        assert_eq!(resp.valid_ids, vec![ItemId::new("b")]);
    }

    #[test]
    fn test_missing_item_ids_is_empty() {
        let req: ValidateRequest = serde_json::from_str("{}").unwrap();
        assert!(req.item_ids.is_empty());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = r#"{"id":"a","status":"reserved"}"#;
        assert!(serde_json::from_str::<ItemAvailability>(json).is_err());
    }
}
