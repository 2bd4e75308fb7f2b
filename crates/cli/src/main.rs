//! My Kanty CLI - drive the storefront client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add a product to the cart
//! kanty cart add 7 --name Shirt --price 2500 --image /img/7.png
//!
//! # Change a quantity (0 or less removes the line)
//! kanty cart update 7 3
//!
//! # Show the cart
//! kanty cart show
//!
//! # Toggle a product in the wishlist
//! kanty wishlist toggle 42
//!
//! # Search products
//! kanty search "robe wax"
//!
//! # Format a price
//! kanty price 2500
//! ```
//!
//! State is stored under `KANTY_STORAGE_DIR`; see `kanty_storefront::config`
//! for the other environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};
use kanty_core::{CurrencyCode, ProductId};
use kanty_storefront::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "kanty")]
#[command(author, version, about = "My Kanty storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Search products
    Search {
        /// Search terms (at least 3 characters)
        query: String,
    },
    /// Format an amount the way the storefront displays prices
    Price {
        /// Amount, with a dot or a French decimal comma
        amount: String,

        #[arg(short, long, value_enum, default_value = "xof")]
        currency: Currency,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,

        /// Product name
        #[arg(short, long)]
        name: String,

        /// Unit price
        #[arg(short, long)]
        price: String,

        /// Image URL
        #[arg(short, long, default_value = "")]
        image: String,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        id: ProductId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Set a product's quantity
    Update {
        /// Product ID
        id: ProductId,

        /// New quantity, parsed like a form field
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Show the cart
    Show,
    /// Push the cart to the server now
    Sync,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Add or remove a product
    Toggle {
        /// Product ID
        id: ProductId,
    },
    /// List wishlist products
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum Currency {
    Xof,
    Eur,
    Usd,
}

impl From<Currency> for CurrencyCode {
    fn from(currency: Currency) -> Self {
        match currency {
            Currency::Xof => Self::XOF,
            Currency::Eur => Self::EUR,
            Currency::Usd => Self::USD,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Price { amount, currency } = &cli.command {
        commands::price::format(amount, (*currency).into())?;
        return Ok(());
    }

    let config = StorefrontConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Cart { action } => {
            let mut storefront = commands::open_storefront(&config)?;
            match action {
                CartAction::Add {
                    id,
                    name,
                    price,
                    image,
                } => commands::cart::add(&mut storefront, id, &name, &price, &image).await?,
                CartAction::Remove { id, yes } => {
                    commands::cart::remove(&mut storefront, &id, yes).await?;
                }
                CartAction::Update { id, quantity } => {
                    commands::cart::update(&mut storefront, &id, &quantity).await?;
                }
                CartAction::Show => commands::cart::show(&storefront),
                CartAction::Sync => commands::cart::sync(&config, &storefront).await?,
            }
        }
        Commands::Wishlist { action } => {
            let mut storefront = commands::open_storefront(&config)?;
            match action {
                WishlistAction::Toggle { id } => commands::wishlist::toggle(&mut storefront, id)?,
                WishlistAction::List => commands::wishlist::list(&storefront),
            }
        }
        Commands::Search { query } => commands::search::run(&config, &query).await?,
        Commands::Price { .. } => {}
    }
    Ok(())
}
