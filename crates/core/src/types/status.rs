//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Availability status of a catalog item.
///
/// Vintage pieces are one-offs: an item is either still for sale, sold through
/// the site, or sold in person at a market stall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Listed and purchasable.
    #[default]
    Available,
    /// Sold online.
    Sold,
    /// Sold in person (recorded by the seller after the fact).
    OfflineSold,
}

impl ItemStatus {
    /// Returns `true` only for [`ItemStatus::Available`].
    #[must_use]
    pub const fn is_purchasable(self) -> bool {
        matches!(self, Self::Available)
    }

    /// The database/wire representation of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
            Self::OfflineSold => "offline_sold",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "sold" => Ok(Self::Sold),
            "offline_sold" => Ok(Self::OfflineSold),
            _ => Err(format!("invalid item status: {s}")),
        }
    }
}
