//! Business logic services for storefront.
//!
//! # Services
//!
//! - `availability` - Which requested cart items are still purchasable

pub mod availability;
