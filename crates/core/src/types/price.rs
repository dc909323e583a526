//! Type-safe price representation using decimal arithmetic.
//!
//! The shop sells in Malaysian ringgit only, so a [`Price`] is a bare decimal
//! amount and carries no currency code. Display follows the storefront:
//! `RM 120`, rounded to whole ringgit.

use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currency prefix used when displaying prices.
pub const CURRENCY_PREFIX: &str = "RM";

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount does not fit the catalog's `NUMERIC(10,2)` column.
    #[error("price cannot exceed 99999999.99")]
    TooLarge,
}

/// A price in ringgit.
///
/// ```
/// use ximy_core::Price;
///
/// let price: Price = "119.50".parse().unwrap();
/// assert_eq!(price.display(), "RM 120");
/// ```
///
/// Parsed and deserialized prices lie in `0..=Price::MAX`. Sums saturate at
/// `Decimal::MAX` instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero ringgit.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest price a catalog item can carry (`99999999.99`).
    pub const MAX: Self = Self(Decimal::from_parts(1_410_065_407, 2, 0, false, 2));

    /// Create a price from a decimal amount without range checks.
    ///
    /// For amounts already bounded elsewhere, such as database rows.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of ringgit.
    #[must_use]
    pub fn from_ringgit(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// Parse a non-negative decimal amount such as `"120"` or `"89.90"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` if the input is not a number,
    /// `PriceError::Negative` if it is below zero and `PriceError::TooLarge`
    /// if it is above [`Price::MAX`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::try_from(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded to whole ringgit, halves away from zero.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format for display, e.g. `RM 120`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{CURRENCY_PREFIX} {}", self.rounded())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
