//! WhatsApp checkout: turns the cart into an inquiry message for the seller.
//!
//! There is no payment step. The visitor sends the seller a message listing
//! links to each item plus the total, and the sale happens in the chat.
//! Totals are computed from the price snapshots in the cart, never from live
//! catalog prices, so the seller sees the same number the visitor did.

use thiserror::Error;
use ximy_core::{CartEntry, Price};

/// Opening line of a multi-item cart message.
const CART_GREETING: &str = "Hai! Barang ni masih ada?";

/// Opening line of a single-item inquiry.
const ITEM_GREETING: &str = "barang ni ada stok?";

/// Path prefix of item detail pages.
const DETAIL_PATH: &str = "/collection";

/// Errors from composing or dispatching a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// There is nothing to send.
    #[error("cart is empty")]
    EmptyCart,
}

/// A composed cart message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutMessage {
    /// Plain-text body.
    pub text: String,
    /// Sum of the entries' price snapshots.
    pub total: Price,
    /// Number of entries listed.
    pub item_count: usize,
}

/// Where a composed message is handed off to.
pub trait MessageChannel {
    /// What the hand-off produces (a link to open, a delivery receipt, ...).
    type Handle;

    /// Hand `text` to the channel.
    fn hand_off(&self, text: &str) -> Self::Handle;
}

/// WhatsApp click-to-chat: the hand-off is a `wa.me` link with the message
/// pre-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppChannel {
    number: String,
}

impl WhatsAppChannel {
    /// Create a channel for the seller's number in international format,
    /// digits only (e.g. `60149226456`).
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
        }
    }
}

impl MessageChannel for WhatsAppChannel {
    type Handle = String;

    fn hand_off(&self, text: &str) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.number,
            urlencoding::encode(text)
        )
    }
}

/// Sum of the price snapshots of `entries`.
#[must_use]
pub fn total(entries: &[CartEntry]) -> Price {
    entries.iter().map(|entry| entry.price).sum()
}

/// Composes checkout messages with links back to the storefront.
#[derive(Debug, Clone)]
pub struct CheckoutDispatcher {
    site_url: String,
}

impl CheckoutDispatcher {
    /// Create a dispatcher linking to item pages under `site_url`.
    #[must_use]
    pub fn new(site_url: &str) -> Self {
        Self {
            site_url: site_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Link to an entry's detail page.
    #[must_use]
    pub fn item_link(&self, entry: &CartEntry) -> String {
        format!("{}{DETAIL_PATH}/{}", self.site_url, entry.slug)
    }

    /// Compose the message for a whole cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if `entries` is empty.
    pub fn compose(&self, entries: &[CartEntry]) -> Result<CheckoutMessage, CheckoutError> {
        if entries.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let links = entries
            .iter()
            .map(|entry| self.item_link(entry))
            .collect::<Vec<_>>()
            .join("\n");
        let total = total(entries);

        Ok(CheckoutMessage {
            text: format!("{CART_GREETING}\n\n{links}\n\nTotal: {}", total.display()),
            total,
            item_count: entries.len(),
        })
    }

    /// Compose the cart message and hand it to `channel`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if `entries` is empty; nothing is
    /// handed off in that case.
    pub fn dispatch<C: MessageChannel>(
        &self,
        entries: &[CartEntry],
        channel: &C,
    ) -> Result<C::Handle, CheckoutError> {
        let message = self.compose(entries)?;
        tracing::info!(
            items = message.item_count,
            total = %message.total,
            "dispatching cart inquiry"
        );
        Ok(channel.hand_off(&message.text))
    }

    /// Compose the inquiry sent from a single item's detail page.
    #[must_use]
    pub fn compose_inquiry(entry: &CartEntry) -> String {
        let mut text = format!(
            "{ITEM_GREETING}\n\nItem: {}\nItem ID: {}",
            entry.title, entry.id
        );
        if let Some(image_url) = &entry.image_url {
            text.push_str("\nImage: ");
            text.push_str(image_url);
        }
        text
    }
}
