//! Terminal cart: the browser cart's behavior with a file for local storage.
//!
//! Every invocation is a fresh "page load": the cart is read from
//! `XIMY_CART_PATH` and reconciled against the storefront before the command
//! runs.
//!
//! # Environment Variables
//!
//! - `XIMY_STOREFRONT_URL` - Storefront serving `/api/cart/validate`
//! - `XIMY_CART_PATH` - Cart file
//! - `XIMY_WHATSAPP_NUMBER` - Seller's number for checkout links
//! - `XIMY_VALIDATION_TIMEOUT_MS` - Availability check deadline

use thiserror::Error;

use ximy_cart::{
    AddOutcome, CartClientConfig, CartController, CartError, CartStore, CheckoutDispatcher,
    CheckoutError, ConfigError, FileStorage, HttpValidator, MessageChannel, ReconcileOutcome,
    ValidatorError, WhatsAppChannel,
};
use ximy_core::{CartEntry, ItemId, Price, PriceError, Slug};

/// Errors from cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot reach storefront: {0}")]
    Validator(#[from] ValidatorError),

    #[error("{0}")]
    Cart(#[from] CartError),

    #[error("Cannot check out: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Invalid price: {0}")]
    Price(#[from] PriceError),
}

/// A loaded cart plus what checkout needs.
pub struct CartSession {
    controller: CartController<FileStorage, HttpValidator>,
    dispatcher: CheckoutDispatcher,
    channel: WhatsAppChannel,
}

/// Load the cart and reconcile it, as a page load would.
pub async fn open() -> Result<CartSession, CartCommandError> {
    let config = CartClientConfig::from_env()?;
    tracing::debug!(path = %config.cart_path.display(), "opening cart");

    let validator = HttpValidator::new(&config.storefront_url, config.validation_timeout)?;
    let store = CartStore::new(FileStorage::new(&config.cart_path));
    let mut controller =
        CartController::new(store, validator).with_timeout(config.validation_timeout);

    match controller.reconcile_on_load().await {
        ReconcileOutcome::Pruned(n) => {
            tracing::info!("{n} item(s) in your cart have been sold and were removed");
        }
        ReconcileOutcome::Unverified => {
            tracing::warn!("Could not check availability; showing your cart as saved");
        }
        ReconcileOutcome::Empty | ReconcileOutcome::Unchanged => {}
    }

    Ok(CartSession {
        controller,
        dispatcher: CheckoutDispatcher::new(config.storefront_url.as_str()),
        channel: WhatsAppChannel::new(config.whatsapp_number),
    })
}

/// Print the entries and total.
pub fn list(session: &CartSession) {
    let cart = &session.controller;

    #[allow(clippy::print_stdout)]
    {
        if cart.is_empty() {
            println!("Your cart is empty");
            return;
        }

        println!("Cart ({} item(s))", cart.len());
        for entry in cart.entries() {
            println!(
                "  {:<36}  {:>8}  {}",
                entry.id,
                entry.price.display(),
                entry.title
            );
        }
        println!("Total: {}", cart.total().display());
    }
}

/// Add an entry, checking availability first.
pub async fn add(
    session: &mut CartSession,
    id: String,
    title: String,
    price: &str,
    slug: String,
    image: Option<String>,
) -> Result<(), CartCommandError> {
    let price = Price::parse(price)?;
    let mut entry = CartEntry::new(id, title, price, Slug::from_stored(slug));
    if let Some(url) = image {
        entry = entry.with_image(url);
    }

    let title = entry.title.clone();
    match session.controller.add_to_cart(entry).await? {
        AddOutcome::Added => tracing::info!("Added {title}"),
        AddOutcome::AddedUnverified => {
            tracing::warn!("Added {title} (availability could not be confirmed)");
        }
        AddOutcome::AlreadyPresent => tracing::info!("{title} is already in your cart"),
    }
    Ok(())
}

/// Remove an entry. Removing something not in the cart is not an error.
pub fn remove(session: &mut CartSession, id: String) {
    let id = ItemId::new(id);
    if session.controller.remove_from_cart(&id) {
        tracing::info!("Removed {id}");
    } else {
        tracing::info!("{id} was not in your cart");
    }
}

/// Empty the cart.
pub fn clear(session: &mut CartSession) {
    session.controller.clear_cart();
    tracing::info!("Cart cleared");
}

/// Print the WhatsApp link for the cart.
///
/// A single item goes out as that item's own inquiry, the way its detail
/// page button would send it; two or more go out as one cart message.
pub fn checkout(session: &CartSession) -> Result<(), CartCommandError> {
    let link = match session.controller.entries() {
        [only] => session
            .channel
            .hand_off(&CheckoutDispatcher::compose_inquiry(only)),
        entries => session.dispatcher.dispatch(entries, &session.channel)?,
    };

    #[allow(clippy::print_stdout)]
    {
        println!("Open this link to message the seller:");
        println!("{link}");
    }
    Ok(())
}
