//! Ximy Core - Shared types library.
//!
//! This crate provides common types used across all Ximy components:
//! - `cart` - Visitor-side cart store, availability validator client and checkout
//! - `storefront` - Public storefront service (catalog database, validation API)
//! - `cli` - Command-line tools for migrations, catalog management and the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, slugs, statuses, cart entries and the
//!   availability wire format

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
