//! Page events routed to the state manager.
//!
//! The page's click/change handlers translate DOM events into [`PageEvent`]s
//! and hand them to [`Storefront::dispatch`]. Tests build the same events
//! directly.

use std::time::Instant;

use kanty_core::{ProductId, WishlistChange};
use rust_decimal::Decimal;

use crate::manager::{Mutation, Storefront};
use crate::notifications::NotificationId;
use crate::page::Page;
use crate::storage::{KeyValueStore, StorageError};

/// A user or timer event the state manager reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// "Add to cart" button.
    AddToCart {
        id: ProductId,
        name: String,
        price: Decimal,
        image: String,
    },
    /// "Remove" button on a cart line.
    RemoveFromCart { id: ProductId },
    /// Quantity field changed; `value` is the raw field value.
    UpdateQuantity { id: ProductId, value: String },
    /// Heart button with `data-product-id`.
    ToggleWishlist { id: ProductId },
    /// Close button on a banner.
    DismissNotification(NotificationId),
    /// Timer tick: expire old banners.
    Tick(Instant),
}

/// What handling an event produced.
#[derive(Debug)]
pub enum EventOutcome {
    Cart(Mutation),
    Wishlist(WishlistChange),
    Dismissed(bool),
    Expired(usize),
}

impl<S: KeyValueStore, P: Page> Storefront<S, P> {
    /// Handle one page event.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a cart or wishlist change cannot be persisted.
    pub fn dispatch(&mut self, event: PageEvent) -> Result<EventOutcome, StorageError> {
        match event {
            PageEvent::AddToCart {
                id,
                name,
                price,
                image,
            } => self
                .add_to_cart(id, &name, price, &image)
                .map(EventOutcome::Cart),
            PageEvent::RemoveFromCart { id } => {
                self.remove_from_cart(&id).map(EventOutcome::Cart)
            }
            PageEvent::UpdateQuantity { id, value } => {
                self.update_quantity(&id, &value).map(EventOutcome::Cart)
            }
            PageEvent::ToggleWishlist { id } => self.toggle_wishlist(id).map(EventOutcome::Wishlist),
            PageEvent::DismissNotification(id) => {
                Ok(EventOutcome::Dismissed(self.notifications_mut().dismiss(id)))
            }
            PageEvent::Tick(now) => Ok(EventOutcome::Expired(self.notifications_mut().sweep(now))),
        }
    }
}
