//! Cart and wishlist state manager.
//!
//! [`Storefront`] is the single source of truth for the cart and wishlist on
//! the client. Each operation reads the persisted collection, applies one
//! change, writes the whole collection back, updates the page, and (for the
//! cart, when the session is authenticated) starts a background push to the
//! server. Local storage stays authoritative whatever the push does.

use std::sync::Arc;

use kanty_core::{Cart, ProductId, QuantityChange, Wishlist, WishlistChange};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::notifications::{NotificationCenter, NotificationKind};
use crate::page::{Page, is_cart_path};
use crate::state::ClientState;
use crate::storage::{KeyValueStore, StorageError};
use crate::sync::{CartSyncer, SyncHandle, spawn_sync};

/// Shown after a product is added to the cart.
pub const MSG_ADDED_TO_CART: &str = "Produit ajouté au panier !";

/// Shown after a product is added to the wishlist.
pub const MSG_WISHLIST_ADDED: &str = "Ajouté à la liste de souhaits";

/// Shown after a product is removed from the wishlist.
pub const MSG_WISHLIST_REMOVED: &str = "Retiré de la liste de souhaits";

/// Outcome of a cart operation.
#[derive(Debug, Default)]
#[must_use = "dropping a Mutation is fine, but its sync handle reports the server push"]
pub struct Mutation {
    /// Whether the persisted cart was written.
    pub persisted: bool,
    /// Background server push, when one was started.
    pub sync: Option<SyncHandle>,
}

impl Mutation {
    const fn unchanged() -> Self {
        Self {
            persisted: false,
            sync: None,
        }
    }
}

/// Client-side cart and wishlist manager bound to one page.
pub struct Storefront<S, P> {
    state: ClientState<S>,
    page: P,
    notifications: NotificationCenter,
    syncer: Option<Arc<dyn CartSyncer>>,
}

impl<S, P: std::fmt::Debug> std::fmt::Debug for Storefront<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("page", &self.page)
            .field("syncer", &self.syncer.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Create a manager over `store` for `page`. No server sync is configured.
    pub fn new(store: S, page: P) -> Self {
        Self {
            state: ClientState::new(store),
            page,
            notifications: NotificationCenter::new(),
            syncer: None,
        }
    }

    /// Mirror cart changes to `syncer` when the page is authenticated.
    #[must_use]
    pub fn with_syncer(mut self, syncer: Arc<dyn CartSyncer>) -> Self {
        self.syncer = Some(syncer);
        self
    }

    /// Page load: render the cart badge from the persisted cart.
    pub fn init(&mut self) {
        self.refresh_cart_count();
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be persisted.
    #[instrument(skip(self, name, image))]
    pub fn add_to_cart(
        &mut self,
        id: ProductId,
        name: &str,
        price: Decimal,
        image: &str,
    ) -> Result<Mutation, StorageError> {
        let mut cart = self.state.load_cart();
        let quantity = cart.add(id, name, price, image);
        debug!(quantity, "Cart line updated");

        self.state.save_cart(&cart)?;
        self.page.set_cart_count(cart.total_quantity());
        self.notifications
            .show(MSG_ADDED_TO_CART, NotificationKind::Success);

        Ok(Mutation {
            persisted: true,
            sync: self.sync(cart),
        })
    }

    /// Remove a product's line from the cart.
    ///
    /// On the cart page the page is reloaded so it re-renders from storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn remove_from_cart(&mut self, id: &ProductId) -> Result<Mutation, StorageError> {
        let mut cart = self.state.load_cart();
        cart.remove(id);

        self.state.save_cart(&cart)?;
        self.page.set_cart_count(cart.total_quantity());
        let sync = self.sync(cart);

        if is_cart_path(self.page.pathname()) {
            self.page.reload();
        }

        Ok(Mutation {
            persisted: true,
            sync,
        })
    }

    /// Set a line's quantity from raw input (a form field value).
    ///
    /// The input is parsed like `parseInt`. A value of zero or less removes
    /// the line exactly as [`Self::remove_from_cart`] does. Input that is not
    /// a number, or an ID that is not in the cart, changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, id: &ProductId, raw: &str) -> Result<Mutation, StorageError> {
        let Some(quantity) = parse_int(raw) else {
            debug!("Quantity is not a number, ignoring");
            return Ok(Mutation::unchanged());
        };

        if quantity <= 0 {
            return self.remove_from_cart(id);
        }

        let mut cart = self.state.load_cart();
        match cart.set_quantity(id, quantity) {
            QuantityChange::Missing => Ok(Mutation::unchanged()),
            QuantityChange::Updated | QuantityChange::Removed => {
                self.state.save_cart(&cart)?;
                self.page.set_cart_count(cart.total_quantity());
                Ok(Mutation {
                    persisted: true,
                    sync: self.sync(cart),
                })
            }
        }
    }

    /// Add a product to the wishlist, or remove it if already present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the wishlist cannot be persisted.
    #[instrument(skip(self))]
    pub fn toggle_wishlist(&mut self, id: ProductId) -> Result<WishlistChange, StorageError> {
        let mut wishlist = self.state.load_wishlist();
        let change = wishlist.toggle(id.clone());

        match change {
            WishlistChange::Removed => self
                .notifications
                .show(MSG_WISHLIST_REMOVED, NotificationKind::Info),
            WishlistChange::Added => self
                .notifications
                .show(MSG_WISHLIST_ADDED, NotificationKind::Success),
        };

        self.state.save_wishlist(&wishlist)?;
        self.page.set_wishlist_state(&id, change.is_member());
        Ok(change)
    }

    /// Re-render the cart badge from storage.
    pub fn refresh_cart_count(&mut self) {
        let count = self.state.load_cart().total_quantity();
        self.page.set_cart_count(count);
    }

    /// Current persisted cart.
    pub fn cart(&self) -> Cart {
        self.state.load_cart()
    }

    /// Current persisted wishlist.
    pub fn wishlist(&self) -> Wishlist {
        self.state.load_wishlist()
    }

    pub const fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub const fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    fn sync(&self, cart: Cart) -> Option<SyncHandle> {
        if !self.page.is_user_authenticated() {
            return None;
        }
        let syncer = self.syncer.as_ref()?;
        spawn_sync(Arc::clone(syncer), cart)
    }
}

/// Parse an integer prefix the way `parseInt(value, 10)` does.
///
/// Leading whitespace and one sign are accepted, then digits up to the first
/// non-digit. Returns `None` when there are no digits. Values beyond `i64`
/// saturate.
#[must_use]
pub fn parse_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, trimmed.get(1..)?),
        Some(b'+') => (false, trimmed.get(1..)?),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = digits.get(..end)?;
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.bytes().fold(0_i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}
