//! Wishlist commands.

use kanty_core::ProductId;

use super::{CliStorefront, CommandError, print_notifications};

/// Add `id` to the wishlist, or remove it if already there.
///
/// # Errors
///
/// Returns `CommandError` if the wishlist cannot be saved.
pub fn toggle(storefront: &mut CliStorefront, id: ProductId) -> Result<(), CommandError> {
    let change = storefront.toggle_wishlist(id)?;
    tracing::debug!(?change, "Wishlist toggled");
    print_notifications(storefront);
    Ok(())
}

/// Print the wishlist, one product ID per line.
#[allow(clippy::print_stdout)]
pub fn list(storefront: &CliStorefront) {
    let wishlist = storefront.wishlist();
    if wishlist.is_empty() {
        println!("Votre liste de souhaits est vide");
    }
    for id in wishlist.ids() {
        println!("{id}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kanty_storefront::{FileStore, HeadlessPage, Storefront};

    use super::*;

    #[test]
    fn test_toggle_twice_restores_wishlist() {
        let dir = tempfile::tempdir().unwrap();
        let mut sf = Storefront::new(FileStore::open(dir.path()).unwrap(), HeadlessPage::new("/"));

        toggle(&mut sf, ProductId::from(42)).unwrap();
        assert_eq!(sf.wishlist().ids(), &[ProductId::from(42)]);

        toggle(&mut sf, ProductId::from(42)).unwrap();
        assert!(sf.wishlist().is_empty());
    }
}
