//! Ximy cart - the visitor-side inquiry cart.
//!
//! The cart lives entirely on the visitor's side. The server is only ever asked
//! "is this item still available", never "what is in this cart".
//!
//! # Components
//!
//! - [`storage`] - Key-value slot the cart payload is persisted in (memory or file)
//! - [`store`] - Versioned load/save of the entry list on top of a slot
//! - [`validator`] - Remote availability check (HTTP client for `/api/cart/validate`)
//! - [`controller`] - The only thing that mutates the cart; owns the fallback policy
//! - [`checkout`] - Composes the WhatsApp inquiry message from cart snapshots
//! - [`config`] - Client configuration from environment variables
//!
//! # Example
//!
//! ```rust,ignore
//! use ximy_cart::{CartController, CartStore, FileStorage, HttpValidator};
//!
//! let store = CartStore::new(FileStorage::new(".ximy/cart.json"));
//! let validator = HttpValidator::new(&config.storefront_url, config.validation_timeout)?;
//! let mut cart = CartController::new(store, validator);
//!
//! cart.reconcile_on_load().await;
//! cart.add_to_cart(entry).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod controller;
pub mod storage;
pub mod store;
pub mod validator;

pub use checkout::{CheckoutDispatcher, CheckoutError, CheckoutMessage, MessageChannel, WhatsAppChannel};
pub use config::{CartClientConfig, ConfigError};
pub use controller::{AddOutcome, CartController, CartError, ReconcileOutcome};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CART_VERSION, CartStore, StoredCart};
pub use validator::{Availability, AvailabilityValidator, HttpValidator, ValidatorError};
