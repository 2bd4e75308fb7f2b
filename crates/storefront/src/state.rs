//! Persistent client state: the cart and wishlist slots.
//!
//! Every mutation reads the full collection, modifies it, and writes it back.
//! Reads never fail: a missing slot or a value that does not decode is
//! treated as an empty collection, and an undecodable slot is cleared. A
//! cart line that does not decode is dropped on its own.

use kanty_core::{Cart, CartItem, ProductId, Wishlist};
use tracing::warn;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key for the cart slot.
pub const CART_KEY: &str = "cart";

/// Storage key for the wishlist slot.
pub const WISHLIST_KEY: &str = "wishlist";

/// `load()`/`save()` access to the cart and wishlist over any store.
#[derive(Debug, Clone)]
pub struct ClientState<S> {
    store: S,
}

impl<S: KeyValueStore> ClientState<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load the cart, defaulting to empty.
    pub fn load_cart(&self) -> Cart {
        let Some(lines) = self.load_json::<Vec<serde_json::Value>>(CART_KEY) else {
            return Cart::new();
        };

        let items = lines
            .into_iter()
            .filter_map(|line| match serde_json::from_value::<CartItem>(line) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(error = %e, "Dropping cart line that does not decode");
                    None
                }
            })
            .collect();
        Cart::from_items(items)
    }

    /// Persist the full cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store rejects the write.
    pub fn save_cart(&self, cart: &Cart) -> Result<(), StorageError> {
        self.save_json(CART_KEY, cart)
    }

    /// Load the wishlist, defaulting to empty.
    pub fn load_wishlist(&self) -> Wishlist {
        self.load_json::<Vec<ProductId>>(WISHLIST_KEY)
            .map(Wishlist::from_ids)
            .unwrap_or_default()
    }

    /// Persist the full wishlist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store rejects the write.
    pub fn save_wishlist(&self, wishlist: &Wishlist) -> Result<(), StorageError> {
        self.save_json(WISHLIST_KEY, wishlist)
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read client state, using empty value");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Stored client state does not decode, clearing it");
                if let Err(e) = self.store.remove_item(key) {
                    warn!(key, error = %e, "Failed to clear client state");
                }
                None
            }
        }
    }

    fn save_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        // Serializing cart and wishlist types cannot fail: no maps with non-string keys.
        let raw = serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string());
        self.store.set_item(key, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_missing_slots_load_empty() {
        let state = ClientState::new(MemoryStore::new());
        assert!(state.load_cart().is_empty());
        assert!(state.load_wishlist().is_empty());
    }

    #[test]
    fn test_garbage_loads_empty() {
        let store = MemoryStore::new();
        store.set_item(CART_KEY, "{not json").unwrap();
        store.set_item(WISHLIST_KEY, r#"{"a":1}"#).unwrap();
        let state = ClientState::new(store);
        assert!(state.load_cart().is_empty());
        assert!(state.load_wishlist().is_empty());
        assert_eq!(state.store().get_item(CART_KEY).unwrap(), None);
        assert_eq!(state.store().get_item(WISHLIST_KEY).unwrap(), None);
    }

    #[test]
    fn test_bad_cart_line_is_dropped_alone() {
        let store = MemoryStore::new();
        store
            .set_item(
                CART_KEY,
                r#"[
                    {"id":1,"name":"Pagne","price":5000,"image":"/1.png","quantity":2},
                    {"id":2,"name":"Sans prix","image":"/2.png","quantity":1},
                    {"id":3,"name":"Robe","price":"9000","image":"/3.png","quantity":null},
                    {"id":4.5,"name":"Sac","price":3000,"image":"/4.png","quantity":1},
                    {"id":"5","name":"Foulard","price":1500,"image":"/5.png","quantity":1}
                ]"#,
            )
            .unwrap();

        let cart = ClientState::new(store).load_cart();
        let ids: Vec<_> = cart.items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![ProductId::from(1), ProductId::from("5")]);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_cart_roundtrip_preserves_order() {
        let state = ClientState::new(MemoryStore::new());
        let mut cart = Cart::new();
        cart.add(ProductId::from(3), "C", Decimal::from(300), "/c.png");
        cart.add(ProductId::from(1), "A", Decimal::from(100), "/a.png");
        cart.add(ProductId::from(2), "B", Decimal::from(200), "/b.png");
        state.save_cart(&cart).unwrap();
        assert_eq!(state.load_cart(), cart);
    }

    #[test]
    fn test_wishlist_roundtrip() {
        let state = ClientState::new(MemoryStore::new());
        let wishlist = Wishlist::from_ids(vec![ProductId::from(42), ProductId::from("x")]);
        state.save_wishlist(&wishlist).unwrap();
        assert_eq!(state.load_wishlist(), wishlist);
    }

    #[test]
    fn test_reads_browser_written_cart() {
        let store = MemoryStore::new();
        store
            .set_item(
                CART_KEY,
                r#"[{"id":7,"name":"Shirt","price":"2500","image":"/img/7.png","quantity":2}]"#,
            )
            .unwrap();
        let cart = ClientState::new(store).load_cart();
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.items()[0].price, Decimal::from(2500));
    }
}
