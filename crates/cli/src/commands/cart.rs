//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! kanty cart add 7 --name Shirt --price 2500 --image /img/7.png
//! kanty cart update 7 3
//! kanty cart remove 7
//! kanty cart show
//! kanty cart sync
//! ```

use std::io::{BufRead, Write};

use kanty_core::{Price, ProductId};
use kanty_storefront::confirm::{DeleteDecision, confirm_delete};
use kanty_storefront::sync::CartSyncer;
use kanty_storefront::{HttpCartSync, StorefrontConfig};

use super::{CliStorefront, CommandError, print_notifications, report_sync};

/// Add one unit of a product.
///
/// # Errors
///
/// Returns `CommandError` if the price is invalid or the cart cannot be saved.
pub async fn add(
    storefront: &mut CliStorefront,
    id: ProductId,
    name: &str,
    price: &str,
    image: &str,
) -> Result<(), CommandError> {
    let price = Price::parse_amount(price)?;
    let mutation = storefront.add_to_cart(id, name, price, image)?;
    print_notifications(storefront);
    report_sync(mutation).await;
    Ok(())
}

/// Remove a product's line, after confirmation unless `yes` is set.
///
/// # Errors
///
/// Returns `CommandError` if the cart cannot be saved.
pub async fn remove(
    storefront: &mut CliStorefront,
    id: &ProductId,
    yes: bool,
) -> Result<(), CommandError> {
    if !yes && confirm_delete(None, &prompt_stdin) == DeleteDecision::Cancel {
        tracing::info!("Nothing removed");
        return Ok(());
    }

    let mutation = storefront.remove_from_cart(id)?;
    report_sync(mutation).await;
    show(storefront);
    Ok(())
}

/// Set a product's quantity from raw input.
///
/// # Errors
///
/// Returns `CommandError` if the cart cannot be saved.
pub async fn update(
    storefront: &mut CliStorefront,
    id: &ProductId,
    quantity: &str,
) -> Result<(), CommandError> {
    let mutation = storefront.update_quantity(id, quantity)?;
    if !mutation.persisted {
        tracing::warn!(%id, quantity, "Cart unchanged");
    }
    report_sync(mutation).await;
    show(storefront);
    Ok(())
}

/// Print the cart.
#[allow(clippy::print_stdout)]
pub fn show(storefront: &CliStorefront) {
    let cart = storefront.cart();
    if cart.is_empty() {
        println!("Votre panier est vide");
        return;
    }

    for item in cart.items() {
        println!(
            "{}\t{}\t{} x {}\t{}",
            item.id,
            item.name,
            item.quantity,
            Price::xof(item.price),
            Price::xof(item.line_total()),
        );
    }
    println!(
        "Total: {} ({} articles)",
        cart.subtotal(),
        cart.total_quantity()
    );
}

/// Push the persisted cart to the server and wait for the answer.
///
/// # Errors
///
/// Returns `CommandError` if the push fails.
pub async fn sync(config: &StorefrontConfig, storefront: &CliStorefront) -> Result<(), CommandError> {
    let syncer = HttpCartSync::new(&config.base_url, config.csrf_token.clone())?;
    let ack = syncer.push(&storefront.cart()).await?;
    tracing::info!(extra = ?ack.extra, "Cart synchronized with server");
    Ok(())
}

/// Ask on stderr and read the answer from stdin.
#[allow(clippy::print_stderr)]
fn prompt_stdin(message: &str) -> bool {
    eprint!("{message} [o/N] ");
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "o" | "oui" | "y" | "yes"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kanty_storefront::{FileStore, HeadlessPage, Storefront};

    use super::*;

    fn storefront(dir: &std::path::Path) -> CliStorefront {
        Storefront::new(FileStore::open(dir).unwrap(), HeadlessPage::new("/"))
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("o\n"));
        assert!(is_yes(" Oui "));
        assert!(is_yes("yes"));
        assert!(!is_yes(""));
        assert!(!is_yes("non"));
    }

    #[tokio::test]
    async fn test_add_then_update_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();

        let mut sf = storefront(dir.path());
        add(&mut sf, ProductId::from(7), "Shirt", "2 500", "/img/7.png")
            .await
            .unwrap();
        update(&mut sf, &ProductId::from(7), "3").await.unwrap();

        let reopened = storefront(dir.path());
        let cart = reopened.cart();
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal().to_string(), "7\u{202f}500\u{a0}F CFA");
    }

    #[tokio::test]
    async fn test_invalid_price_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sf = storefront(dir.path());
        let err = add(&mut sf, ProductId::from(7), "Shirt", "gratuit", "")
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Price(_)));
        assert!(sf.cart().is_empty());
    }

    #[tokio::test]
    async fn test_remove_with_yes_skips_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mut sf = storefront(dir.path());
        add(&mut sf, ProductId::from(7), "Shirt", "2500", "")
            .await
            .unwrap();
        remove(&mut sf, &ProductId::from(7), true).await.unwrap();
        assert!(sf.cart().is_empty());
    }
}
