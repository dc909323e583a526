//! Core types for Ximy.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod availability;
pub mod cart;
pub mod id;
pub mod price;
pub mod slug;
pub mod status;

pub use availability::{ItemAvailability, ValidateRequest, ValidateResponse};
pub use cart::CartEntry;
pub use id::*;
pub use price::{Price, PriceError};
pub use slug::{Slug, SlugError};
pub use status::*;
