//! Client-side shopping cart.
//!
//! The cart is an ordered list of line items keyed by product ID. It is
//! persisted as a JSON array (`[{"id":7,"name":"Shirt",...}]`), so the field
//! names and order here are the storage format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::{Price, json_number};

/// A single line in the cart.
///
/// `quantity` is at least 1 for as long as the line exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "json_number")]
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// Create a new line with quantity 1.
    #[must_use]
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image: image.into(),
            quantity: 1,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Result of [`Cart::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has the requested quantity.
    Updated,
    /// The requested quantity was zero or negative, so the line was removed.
    Removed,
    /// No line with that ID exists; nothing changed.
    Missing,
}

/// Ordered sequence of cart lines, unique by `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored lines.
    ///
    /// Lines with a zero quantity are dropped, and a repeated ID is folded
    /// into the first line carrying it.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart.items.iter_mut().find(|line| line.id == item.id) {
                Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Add one unit of a product.
    ///
    /// An existing line gets its quantity incremented; otherwise a new line
    /// with quantity 1 is appended. Returns the line's new quantity.
    pub fn add(
        &mut self,
        id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        image: impl Into<String>,
    ) -> u32 {
        if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }
        self.items.push(CartItem::new(id, name, price, image));
        1
    }

    /// Remove the line for a product. Returns `true` if a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| &line.id != id);
        self.items.len() != before
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line instead of storing it.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> QuantityChange {
        let Some(line) = self.items.iter_mut().find(|line| &line.id == id) else {
            return QuantityChange::Missing;
        };

        if quantity <= 0 {
            self.remove(id);
            return QuantityChange::Removed;
        }

        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        QuantityChange::Updated
    }

    /// Look up a line by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|line| &line.id == id)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities (the cart badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |sum, line| sum.saturating_add(line.quantity))
    }

    /// Sum of all line totals in the marketplace currency.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        Price::xof(self.items.iter().map(CartItem::line_total).sum())
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}
