//! Ximy CLI - Database migrations, catalog management and a terminal cart.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! ximy-cli migrate
//!
//! # Load catalog items from YAML
//! ximy-cli seed items catalog.yaml
//!
//! # Manage items
//! ximy-cli item add --title "Levi's 501 Denim Jacket" --price 120
//! ximy-cli item status 0b7c6f1e-8d0a-4c55-9a51-2f1f6d3c9e11 sold
//! ximy-cli item show levi-s-501-denim-jacket
//! ximy-cli item delete 0b7c6f1e-8d0a-4c55-9a51-2f1f6d3c9e11
//!
//! # Dashboard counts
//! ximy-cli stats
//!
//! # Drive a cart against a running storefront
//! ximy-cli cart add --id 0b7c6f1e-... --title "Denim Jacket" --price 120 --slug denim-jacket
//! ximy-cli cart list
//! ximy-cli cart checkout
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed items` - Insert catalog items from a YAML file
//! - `item` - Create, update, show and delete items
//! - `stats` - Catalog, view and click counts
//! - `cart` - Local cart backed by a file, validated against the storefront

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ximy-cli")]
#[command(author, version, about = "Ximy Vintage CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage catalog items
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Work with the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Print catalog, view and click counts
    Stats,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert catalog items from a YAML file
    Items {
        /// Path to the YAML file
        file: String,
    },
}

#[derive(Subcommand)]
enum ItemAction {
    /// Create an item with a unique slug
    Add {
        /// Item title
        #[arg(short, long)]
        title: String,

        /// Price in ringgit (e.g. 120 or 89.90)
        #[arg(short, long)]
        price: String,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,

        /// Image URL (repeat for more; the first is primary)
        #[arg(short, long = "image")]
        images: Vec<String>,
    },
    /// Change an item's status (`available`, `sold`, `offline_sold`)
    Status {
        /// Item ID
        id: String,
        /// New status
        status: String,
    },
    /// Show an item with its view and click counts and inquiry link
    Show {
        /// Item slug
        slug: String,
    },
    /// Delete an item; carts drop it on their next load
    Delete {
        /// Item ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart entries and the total
    List,
    /// Re-check every entry against the storefront
    Reconcile,
    /// Add an item
    Add {
        /// Item ID
        #[arg(long)]
        id: String,

        /// Item title
        #[arg(long)]
        title: String,

        /// Price in ringgit
        #[arg(long)]
        price: String,

        /// Item slug
        #[arg(long)]
        slug: String,

        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove an item
    Remove {
        /// Item ID
        id: String,
    },
    /// Remove every item
    Clear,
    /// Print the WhatsApp link for the cart
    Checkout,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Items { file } => commands::seed::items(&file).await?,
        },
        Commands::Item { action } => match action {
            ItemAction::Add {
                title,
                price,
                description,
                images,
            } => {
                commands::item::add(&title, &price, description, images).await?;
            }
            ItemAction::Status { id, status } => commands::item::set_status(&id, &status).await?,
            ItemAction::Show { slug } => commands::item::show(&slug).await?,
            ItemAction::Delete { id } => commands::item::delete(&id).await?,
        },
        Commands::Stats => commands::stats::show().await?,
        Commands::Cart { action } => {
            let mut session = commands::cart::open().await?;
            match action {
                CartAction::List | CartAction::Reconcile => {}
                CartAction::Add {
                    id,
                    title,
                    price,
                    slug,
                    image,
                } => commands::cart::add(&mut session, id, title, &price, slug, image).await?,
                CartAction::Remove { id } => commands::cart::remove(&mut session, id),
                CartAction::Clear => commands::cart::clear(&mut session),
                CartAction::Checkout => commands::cart::checkout(&session)?,
            }
            commands::cart::list(&session);
        }
    }
    Ok(())
}
