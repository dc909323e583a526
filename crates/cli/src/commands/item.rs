//! Catalog item management commands.
//!
//! # Usage
//!
//! ```bash
//! ximy-cli item add --title "Levi's 501 Denim Jacket" --price 120 --image https://cdn.ximy.my/a.jpg
//! ximy-cli item status 0b7c6f1e-8d0a-4c55-9a51-2f1f6d3c9e11 offline_sold
//! ximy-cli item show levi-s-501-denim-jacket
//! ximy-cli item delete 0b7c6f1e-8d0a-4c55-9a51-2f1f6d3c9e11
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for storefront
//! - `XIMY_WHATSAPP_NUMBER` / `XIMY_STOREFRONT_URL` - used by `show` for the
//!   inquiry link

use ximy_cart::{CartClientConfig, CheckoutDispatcher, MessageChannel, WhatsAppChannel};
use ximy_core::{CartEntry, ItemId, ItemStatus, Price};
use ximy_storefront::db::{
    ClickRepository, ItemRepository, NewItem, RepositoryError, ViewRepository,
};

use super::{CommandError, connect};

/// Create an item. Returns its ID.
pub async fn add(
    title: &str,
    price: &str,
    description: Option<String>,
    images: Vec<String>,
) -> Result<ItemId, CommandError> {
    let price = Price::parse(price).map_err(|e| CommandError::InvalidInput(e.to_string()))?;
    let mut item =
        NewItem::new(title, price).map_err(|e| CommandError::InvalidInput(e.to_string()))?;
    item.description = description;
    item.image_urls = images;

    let pool = connect().await?;
    let created = ItemRepository::new(&pool).create(&item).await?;

    tracing::info!(
        "Item created! ID: {}, Slug: {}, Price: {}",
        created.id,
        created.slug,
        created.price
    );
    Ok(created.id)
}

/// Change an item's status.
pub async fn set_status(id: &str, status: &str) -> Result<(), CommandError> {
    let status: ItemStatus = status.parse().map_err(CommandError::InvalidInput)?;
    let id = ItemId::new(id);

    let pool = connect().await?;
    ItemRepository::new(&pool)
        .set_status(&id, status)
        .await
        .map_err(|e| not_found_as_input(e, &id))?;

    tracing::info!("Item {} is now {}", id, status);
    if !status.is_purchasable() {
        tracing::info!("Carts holding this item will drop it on their next load");
    }
    Ok(())
}

/// Delete an item by ID.
pub async fn delete(id: &str) -> Result<(), CommandError> {
    let id = ItemId::new(id);

    let pool = connect().await?;
    ItemRepository::new(&pool)
        .delete(&id)
        .await
        .map_err(|e| not_found_as_input(e, &id))?;

    tracing::info!("Item {id} deleted");
    tracing::info!("Carts holding this item will drop it on their next load");
    Ok(())
}

fn not_found_as_input(e: RepositoryError, id: &ItemId) -> CommandError {
    match e {
        RepositoryError::NotFound => CommandError::InvalidInput(format!("no item with ID {id}")),
        other => other.into(),
    }
}

/// Print an item, its view and click counts and its WhatsApp inquiry link.
pub async fn show(slug: &str) -> Result<(), CommandError> {
    let config = CartClientConfig::from_env()
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    let pool = connect().await?;
    let item = ItemRepository::new(&pool)
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| CommandError::InvalidInput(format!("no item with slug {slug}")))?;
    let views = ViewRepository::new(&pool).count_for_item(&item.id).await?;
    let clicks = ClickRepository::new(&pool).count_for_item(&item.id).await?;

    let mut entry = CartEntry::new(
        item.id.clone(),
        item.title.clone(),
        item.price,
        item.slug.clone(),
    );
    if let Some(url) = &item.primary_image_url {
        entry = entry.with_image(url.clone());
    }

    let dispatcher = CheckoutDispatcher::new(config.storefront_url.as_str());
    let channel = WhatsAppChannel::new(config.whatsapp_number);
    let link = channel.hand_off(&CheckoutDispatcher::compose_inquiry(&entry));

    #[allow(clippy::print_stdout)]
    {
        println!("{}", item.title);
        println!("  ID:       {}", item.id);
        println!("  Price:    {}", item.price.display());
        println!("  Status:   {}", item.status);
        if let Some(location) = &item.offline_location {
            println!("  Location: {location}");
        }
        println!("  Page:     {}", dispatcher.item_link(&entry));
        println!("  Views:    {views}");
        println!("  Clicks:   {clicks}");
        println!("  Inquiry:  {link}");
    }
    Ok(())
}
