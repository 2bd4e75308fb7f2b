//! Wishlist of product IDs.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// Result of [`Wishlist::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistChange {
    Added,
    Removed,
}

impl WishlistChange {
    /// Whether the product is in the wishlist after the toggle.
    #[must_use]
    pub const fn is_member(self) -> bool {
        matches!(self, Self::Added)
    }
}

/// Set of wishlisted product IDs, stored as a JSON array in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    ids: Vec<ProductId>,
}

impl Wishlist {
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Build a wishlist from stored IDs, dropping duplicates.
    #[must_use]
    pub fn from_ids(ids: Vec<ProductId>) -> Self {
        let mut wishlist = Self::new();
        for id in ids {
            if !wishlist.contains(&id) {
                wishlist.ids.push(id);
            }
        }
        wishlist
    }

    /// Remove the ID if present, otherwise append it.
    pub fn toggle(&mut self, id: ProductId) -> WishlistChange {
        if let Some(index) = self.ids.iter().position(|existing| *existing == id) {
            self.ids.remove(index);
            WishlistChange::Removed
        } else {
            self.ids.push(id);
            WishlistChange::Added
        }
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
