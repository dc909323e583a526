//! Cart availability decisions, kept free of HTTP and SQL so they can be
//! tested directly.

use std::collections::{HashMap, HashSet};

use ximy_core::{ItemAvailability, ItemId, ItemStatus};

/// Most IDs accepted in one availability request.
pub const MAX_VALIDATE_IDS: usize = 100;

/// Why an availability request was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// More distinct IDs than [`MAX_VALIDATE_IDS`].
    #[error("at most {max} items can be checked at once (got {got})")]
    TooManyIds { max: usize, got: usize },
}

/// Deduplicate `ids`, keeping first-seen order, and enforce the batch limit.
///
/// # Errors
///
/// Returns `RequestError::TooManyIds` if more than [`MAX_VALIDATE_IDS`]
/// distinct IDs remain.
pub fn normalize_request(ids: &[ItemId]) -> Result<Vec<ItemId>, RequestError> {
    let mut seen = HashSet::with_capacity(ids.len());
    let unique: Vec<ItemId> = ids
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect();

    if unique.len() > MAX_VALIDATE_IDS {
        return Err(RequestError::TooManyIds {
            max: MAX_VALIDATE_IDS,
            got: unique.len(),
        });
    }
    Ok(unique)
}

/// The requested IDs whose catalog row is purchasable, in request order.
///
/// IDs with no row (deleted or never existed) are not purchasable.
#[must_use]
pub fn purchasable_ids(requested: &[ItemId], rows: &[ItemAvailability]) -> Vec<ItemId> {
    let status: HashMap<&ItemId, ItemStatus> = rows.iter().map(|row| (&row.id, row.status)).collect();

    requested
        .iter()
        .filter(|id| status.get(id).is_some_and(|s| s.is_purchasable()))
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(id: &str, status: ItemStatus) -> ItemAvailability {
        ItemAvailability {
            id: ItemId::new(id),
            status,
        }
    }

    fn ids(raw: &[&str]) -> Vec<ItemId> {
        raw.iter().map(|id| ItemId::new(*id)).collect()
    }

    #[test]
    fn test_only_available_items_are_purchasable() {
        let rows = [
            row("a", ItemStatus::Available),
            row("b", ItemStatus::Sold),
            row("c", ItemStatus::OfflineSold),
        ];

        assert_eq!(
            purchasable_ids(&ids(&["a", "b", "c", "gone"]), &rows),
            ids(&["a"])
        );
    }

    #[test]
    fn test_result_follows_request_order() {
        let rows = [row("a", ItemStatus::Available), row("b", ItemStatus::Available)];
        assert_eq!(purchasable_ids(&ids(&["b", "a"]), &rows), ids(&["b", "a"]));
    }

    #[test]
    fn test_normalize_deduplicates_before_limit() {
        let repeated: Vec<ItemId> = std::iter::repeat_n(ItemId::new("a"), 500).collect();
        assert_eq!(normalize_request(&repeated).unwrap(), ids(&["a"]));
    }

    #[test]
    fn test_normalize_enforces_limit() {
        let many: Vec<ItemId> = (0..=MAX_VALIDATE_IDS)
            .map(|n| ItemId::new(n.to_string()))
            .collect();
        assert_eq!(
            normalize_request(&many),
            Err(RequestError::TooManyIds {
                max: MAX_VALIDATE_IDS,
                got: MAX_VALIDATE_IDS + 1,
            })
        );

        let limit: Vec<ItemId> = many.into_iter().take(MAX_VALIDATE_IDS).collect();
        assert_eq!(normalize_request(&limit).unwrap().len(), MAX_VALIDATE_IDS);
    }
}
