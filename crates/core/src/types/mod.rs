//! Core types for My Kanty.
//!
//! This module provides type-safe wrappers for the cart and wishlist domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod wishlist;

pub use cart::{Cart, CartItem, QuantityChange};
pub use id::ProductId;
pub use price::{CurrencyCode, Price, PriceParseError};
pub use wishlist::{Wishlist, WishlistChange};
