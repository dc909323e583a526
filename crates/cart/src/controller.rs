//! Cart controller: the only component that mutates the cart.
//!
//! # Entry lifecycle
//!
//! ```text
//! absent --add--> pending_add --available--------> present
//!                             --validator failed--> present   (optimistic)
//!                             --unavailable-------> rejected  (nothing stored)
//! present --remove/clear--> absent
//! present --reconcile finds it unavailable--> absent          (silent prune)
//! ```
//!
//! # Failure policy
//!
//! A failed availability check is handled differently depending on who asked:
//!
//! - adding an item inserts it anyway ([`CartController::add_to_cart`])
//! - reconciling on load keeps every stored entry
//!   ([`CartController::reconcile_on_load`])
//!
//! Only a definitive "unavailable" answer rejects an add or prunes an entry.
//! The two fallbacks live in separate methods and must stay separate.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument, warn};
use ximy_core::{CartEntry, ItemId, Price};

use crate::storage::CartStorage;
use crate::store::CartStore;
use crate::validator::{Availability, AvailabilityValidator, DEFAULT_TIMEOUT, ValidatorError};

/// Errors surfaced to the visitor by cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The catalog says the item is sold or gone.
    #[error("This item is no longer available")]
    ItemUnavailable {
        /// The rejected item.
        id: ItemId,
        /// Its title, for the message shown to the visitor.
        title: String,
    },
}

/// Result of a successful [`CartController::add_to_cart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Availability confirmed and the entry stored.
    Added,
    /// The check failed, so the entry was stored without confirmation.
    AddedUnverified,
    /// An entry with this ID was already in the cart; nothing changed.
    AlreadyPresent,
}

/// Result of [`CartController::reconcile_on_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing stored, no check made.
    Empty,
    /// Every stored entry is still available.
    Unchanged,
    /// This many entries were no longer available and were dropped.
    Pruned(usize),
    /// The check failed; stored entries were kept as they were.
    Unverified,
}

/// Mediates between the [`CartStore`] and an [`AvailabilityValidator`].
///
/// Holds the in-memory entry list, which is authoritative for the session even
/// when persisting fails.
#[derive(Debug)]
pub struct CartController<S, V> {
    store: CartStore<S>,
    validator: V,
    entries: Vec<CartEntry>,
    timeout: Duration,
}

impl<S, V> CartController<S, V>
where
    S: CartStorage,
    V: AvailabilityValidator,
{
    /// Create a controller over whatever the store currently holds.
    ///
    /// Entries are loaded without validation; call
    /// [`reconcile_on_load`](Self::reconcile_on_load) once to prune them.
    #[must_use]
    pub fn new(store: CartStore<S>, validator: V) -> Self {
        let entries = store.load();
        Self {
            store,
            validator,
            entries,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override how long an availability check may take before it counts as
    /// failed.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Session bootstrap: reload the store and drop entries that are no longer
    /// available.
    ///
    /// All stored IDs are checked in a single call; an empty cart makes no call.
    /// The store is rewritten only if something was dropped.
    #[instrument(skip(self))]
    pub async fn reconcile_on_load(&mut self) -> ReconcileOutcome {
        let loaded = self.store.load();
        if loaded.is_empty() {
            self.entries = loaded;
            return ReconcileOutcome::Empty;
        }

        let ids: Vec<ItemId> = loaded.iter().map(|entry| entry.id.clone()).collect();
        match self.check(&ids).await {
            Ok(availability) => self.prune(loaded, &availability),
            Err(e) => self.keep_unverified(loaded, &e),
        }
    }

    /// Add an entry after confirming the item is still available.
    ///
    /// Does nothing if the ID is already in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemUnavailable` if the catalog says the item is no
    /// longer for sale. The cart is left untouched.
    #[instrument(skip(self, entry), fields(item_id = %entry.id))]
    pub async fn add_to_cart(&mut self, entry: CartEntry) -> Result<AddOutcome, CartError> {
        if self.contains(&entry.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        match self.check(std::slice::from_ref(&entry.id)).await {
            Ok(availability) if availability.is_available(&entry.id) => {
                self.insert(entry);
                Ok(AddOutcome::Added)
            }
            Ok(_) => {
                info!("rejected add of unavailable item");
                Err(CartError::ItemUnavailable {
                    id: entry.id,
                    title: entry.title,
                })
            }
            Err(e) => Ok(self.insert_optimistically(entry, &e)),
        }
    }

    /// Remove the entry with `id`. Returns whether anything was removed.
    pub fn remove_from_cart(&mut self, id: &ItemId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| &entry.id != id);

        let removed = self.entries.len() != before;
        if removed {
            self.store.save(&self.entries);
        }
        removed
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.entries.clear();
        self.store.save(&self.entries);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of entries (the cart badge count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry with `id` is in the cart.
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.entries.iter().any(|entry| &entry.id == id)
    }

    /// Sum of the price snapshots.
    #[must_use]
    pub fn total(&self) -> Price {
        crate::checkout::total(&self.entries)
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn check(&self, ids: &[ItemId]) -> Result<Availability, ValidatorError> {
        tokio::time::timeout(self.timeout, self.validator.check(ids))
            .await
            .unwrap_or(Err(ValidatorError::Timeout(self.timeout)))
    }

    fn insert(&mut self, entry: CartEntry) {
        self.entries.push(entry);
        self.store.save(&self.entries);
    }

    fn prune(&mut self, loaded: Vec<CartEntry>, availability: &Availability) -> ReconcileOutcome {
        let before = loaded.len();
        self.entries = loaded
            .into_iter()
            .filter(|entry| availability.is_available(&entry.id))
            .collect();

        let pruned = before - self.entries.len();
        if pruned == 0 {
            return ReconcileOutcome::Unchanged;
        }

        info!(pruned, remaining = self.entries.len(), "pruned unavailable cart entries");
        self.store.save(&self.entries);
        ReconcileOutcome::Pruned(pruned)
    }

    /// Optimistic fallback: the add goes through when availability is unknown.
    fn insert_optimistically(&mut self, entry: CartEntry, error: &ValidatorError) -> AddOutcome {
        warn!(error = %error, "availability unknown, adding item unverified");
        self.insert(entry);
        AddOutcome::AddedUnverified
    }

    /// Conservative fallback: stored entries survive when availability is unknown.
    fn keep_unverified(
        &mut self,
        loaded: Vec<CartEntry>,
        error: &ValidatorError,
    ) -> ReconcileOutcome {
        warn!(error = %error, entries = loaded.len(), "availability unknown, keeping stored cart");
        self.entries = loaded;
        ReconcileOutcome::Unverified
    }
}
