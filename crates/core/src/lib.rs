//! My Kanty Core - Shared domain types.
//!
//! This crate provides the types shared by the client components:
//! - `storefront` - Browser-side cart, wishlist, notifications and search
//! - `cli` - Command-line front end for the cart and wishlist
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! storage access, no HTTP clients. Cart and wishlist mutations are plain
//! methods so they can be exercised without any backend.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, XOF prices, cart line items and the wishlist

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
