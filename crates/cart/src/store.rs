//! Versioned persistence of the cart entry list.
//!
//! The payload is `{"version": "2", "entries": [...]}`. A payload written under
//! any other version is discarded wholesale, never merged. Bumping
//! [`CART_VERSION`] is how a schema change forces every visitor's cart empty.
//!
//! Nothing in here returns an error: an unreadable or unwritable slot degrades
//! to "empty cart" on load and "not persisted" on save, and the caller keeps
//! working from memory.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ximy_core::CartEntry;

use crate::storage::CartStorage;

/// Version tag written with every payload.
pub const CART_VERSION: &str = "2";

/// The persisted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCart {
    /// Version the payload was written under.
    pub version: String,
    /// Entries in insertion order.
    pub entries: Vec<CartEntry>,
}

/// Loads and saves the entry list in a [`CartStorage`] slot.
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    storage: S,
    version: String,
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store that reads and writes [`CART_VERSION`] payloads.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_version(storage, CART_VERSION)
    }

    /// Create a store expecting a specific version tag.
    #[must_use]
    pub fn with_version(storage: S, version: impl Into<String>) -> Self {
        Self {
            storage,
            version: version.into(),
        }
    }

    /// Version tag this store expects and writes.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The underlying slot.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the persisted entries.
    ///
    /// Returns an empty list, and resets the slot to an empty payload of the
    /// current version, when the slot is empty, unparsable or written under
    /// another version. If the slot cannot be read at all the list is empty and
    /// the slot is left alone. Duplicate IDs keep their first occurrence, and
    /// the slot is rewritten so it matches what was returned.
    pub fn load(&self) -> Vec<CartEntry> {
        let payload = match self.storage.read() {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("no stored cart, starting empty");
                self.reset();
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "cart storage unreadable, starting empty");
                return Vec::new();
            }
        };

        let stored = match serde_json::from_str::<StoredCart>(&payload) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "discarding unreadable cart payload");
                self.reset();
                return Vec::new();
            }
        };

        if stored.version != self.version {
            debug!(
                stored = %stored.version,
                expected = %self.version,
                "discarding cart from another version"
            );
            self.reset();
            return Vec::new();
        }

        let stored_len = stored.entries.len();
        let mut seen = HashSet::new();
        let entries: Vec<CartEntry> = stored
            .entries
            .into_iter()
            .filter(|entry| seen.insert(entry.id.clone()))
            .collect();

        if entries.len() != stored_len {
            debug!(
                dropped = stored_len - entries.len(),
                "rewriting cart without duplicate entries"
            );
            self.save(&entries);
        }
        entries
    }

    /// Persist the full entry list under the current version.
    ///
    /// Returns `false` if the slot rejected the write; the failure is logged
    /// and otherwise ignored.
    pub fn save(&self, entries: &[CartEntry]) -> bool {
        let stored = StoredCart {
            version: self.version.clone(),
            entries: entries.to_vec(),
        };

        let payload = match serde_json::to_string(&stored) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to serialize cart");
                return false;
            }
        };

        match self.storage.write(&payload) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, entries = entries.len(), "failed to persist cart");
                false
            }
        }
    }

    fn reset(&self) {
        self.save(&[]);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ximy_core::{Price, Slug};

    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    fn entry(id: &str, price: i64) -> CartEntry {
        CartEntry::new(
            id,
            format!("Item {id}"),
            Price::from_ringgit(price),
            Slug::from_stored(format!("item-{id}")),
        )
    }

    fn stored_version(storage: &MemoryStorage) -> String {
        let stored: StoredCart = serde_json::from_str(&storage.contents().unwrap()).unwrap();
        stored.version
    }

    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("storage disabled".to_owned()))
        }

        fn write(&self, _payload: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_owned()))
        }
    }

    #[test]
    fn test_save_then_load_preserves_insertion_order() {
        let store = CartStore::new(MemoryStorage::new());
        let entries = vec![entry("b", 80), entry("a", 120), entry("c", 10)];

        assert!(store.save(&entries));
        assert_eq!(store.load(), entries);
    }

    #[test]
    fn test_absent_payload_loads_empty_and_writes_current_version() {
        let storage = MemoryStorage::new();
        let store = CartStore::new(storage.clone());

        assert!(store.load().is_empty());
        assert_eq!(stored_version(&storage), CART_VERSION);
    }

    #[test]
    fn test_stale_version_is_discarded_regardless_of_entries() {
        let stale = StoredCart {
            version: "1".to_owned(),
            entries: vec![entry("a", 120), entry("b", 80)],
        };
        let storage = MemoryStorage::with_payload(serde_json::to_string(&stale).unwrap());
        let store = CartStore::with_version(storage.clone(), "2");

        assert!(store.load().is_empty());
        assert_eq!(stored_version(&storage), "2");

        // Next save writes the current tag too
        store.save(&[entry("c", 5)]);
        assert_eq!(stored_version(&storage), "2");
        assert_eq!(store.load(), vec![entry("c", 5)]);
    }

    #[test]
    fn test_corrupt_payload_is_treated_as_absent() {
        for payload in ["not json", "[]", r#"{"version":"2","entries":[{"id":"a"}]}"#] {
            let storage = MemoryStorage::with_payload(payload);
            let store = CartStore::new(storage.clone());

            assert!(store.load().is_empty(), "payload {payload:?} should load empty");
            assert_eq!(stored_version(&storage), CART_VERSION);
        }
    }

    #[test]
    fn test_duplicate_ids_keep_first_occurrence() {
        let stored = StoredCart {
            version: CART_VERSION.to_owned(),
            entries: vec![entry("a", 120), entry("b", 80), entry("a", 999)],
        };
        let storage = MemoryStorage::with_payload(serde_json::to_string(&stored).unwrap());
        let store = CartStore::new(storage.clone());

        assert_eq!(store.load(), vec![entry("a", 120), entry("b", 80)]);

        let rewritten: StoredCart = serde_json::from_str(&storage.contents().unwrap()).unwrap();
        assert_eq!(rewritten.entries, vec![entry("a", 120), entry("b", 80)]);
    }

    #[test]
    fn test_out_of_range_price_is_treated_as_corrupt() {
        let payload = r#"{"version":"2","entries":[
            {"id":"a","title":"A","price":"79228162514264337593543950335","slug":"a"},
            {"id":"b","title":"B","price":"79228162514264337593543950335","slug":"b"}
        ]}"#;
        let storage = MemoryStorage::with_payload(payload);
        let store = CartStore::new(storage.clone());

        assert!(store.load().is_empty());
        assert_eq!(stored_version(&storage), CART_VERSION);
        let reset: StoredCart = serde_json::from_str(&storage.contents().unwrap()).unwrap();
        assert!(reset.entries.is_empty());
    }

    #[test]
    fn test_broken_storage_never_fails() {
        let store = CartStore::new(BrokenStorage);

        assert!(store.load().is_empty());
        assert!(!store.save(&[entry("a", 120)]));
    }
}
