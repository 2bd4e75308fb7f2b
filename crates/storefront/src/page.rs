//! The server-rendered page the state manager runs in.
//!
//! The templates own the markup; the state manager only depends on a few
//! attributes and elements:
//!
//! - `data-user-authenticated="true"` on `<body>` gates server sync
//! - `#cart-count` badge shows the total quantity, hidden when zero
//! - `[data-product-id]` wishlist controls get the `in-wishlist` state
//! - the current pathname decides whether removal reloads the cart page

use std::collections::HashMap;

use kanty_core::ProductId;

/// Value of `data-user-authenticated` that enables server sync.
pub const AUTHENTICATED_FLAG: &str = "true";

/// Operations the state manager performs on the page.
pub trait Page {
    /// Whether the body carries `data-user-authenticated="true"`.
    fn is_user_authenticated(&self) -> bool;

    /// Current `location.pathname`.
    fn pathname(&self) -> &str;

    /// Update the cart badge text and visibility.
    fn set_cart_count(&mut self, count: u32);

    /// Toggle the visual state of every control bound to `id`.
    fn set_wishlist_state(&mut self, id: &ProductId, in_wishlist: bool);

    /// Force a full reload of the current page.
    fn reload(&mut self);
}

/// Whether a pathname is the cart page (or below it).
#[must_use]
pub fn is_cart_path(pathname: &str) -> bool {
    pathname.contains("/cart")
}

/// Cart badge state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartBadge {
    pub count: u32,
    pub visible: bool,
}

/// A page without a browser: records everything the manager does to it.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPage {
    authenticated: bool,
    pathname: String,
    badge: Option<CartBadge>,
    wishlist_controls: HashMap<String, bool>,
    reloads: usize,
}

impl HeadlessPage {
    /// Create a page at `pathname`.
    #[must_use]
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            ..Self::default()
        }
    }

    /// Set the body's `data-user-authenticated` attribute value.
    #[must_use]
    pub fn with_authenticated_attribute(mut self, value: Option<&str>) -> Self {
        self.authenticated = value == Some(AUTHENTICATED_FLAG);
        self
    }

    /// Mark the session as authenticated or anonymous.
    #[must_use]
    pub fn authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    /// Render a wishlist control for `id` with an initial state.
    #[must_use]
    pub fn with_wishlist_control(mut self, id: &ProductId, in_wishlist: bool) -> Self {
        self.wishlist_controls
            .insert(id.attribute_value(), in_wishlist);
        self
    }

    /// Badge state, or `None` if it was never rendered.
    #[must_use]
    pub const fn badge(&self) -> Option<CartBadge> {
        self.badge
    }

    /// State of the wishlist control for `id`, if one is on the page.
    #[must_use]
    pub fn wishlist_control(&self, id: &ProductId) -> Option<bool> {
        self.wishlist_controls.get(&id.attribute_value()).copied()
    }

    /// Number of reloads requested so far.
    #[must_use]
    pub const fn reloads(&self) -> usize {
        self.reloads
    }
}

impl Page for HeadlessPage {
    fn is_user_authenticated(&self) -> bool {
        self.authenticated
    }

    fn pathname(&self) -> &str {
        &self.pathname
    }

    fn set_cart_count(&mut self, count: u32) {
        self.badge = Some(CartBadge {
            count,
            visible: count > 0,
        });
    }

    fn set_wishlist_state(&mut self, id: &ProductId, in_wishlist: bool) {
        // Only controls present on the page are updated.
        if let Some(state) = self.wishlist_controls.get_mut(&id.attribute_value()) {
            *state = in_wishlist;
        }
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_attribute() {
        let page = HeadlessPage::new("/").with_authenticated_attribute(Some("true"));
        assert!(page.is_user_authenticated());

        for value in [None, Some("false"), Some("True"), Some("")] {
            let page = HeadlessPage::new("/").with_authenticated_attribute(value);
            assert!(!page.is_user_authenticated());
        }
    }

    #[test]
    fn test_badge_hidden_when_zero() {
        let mut page = HeadlessPage::new("/");
        assert_eq!(page.badge(), None);
        page.set_cart_count(3);
        assert_eq!(
            page.badge(),
            Some(CartBadge {
                count: 3,
                visible: true
            })
        );
        page.set_cart_count(0);
        assert_eq!(
            page.badge(),
            Some(CartBadge {
                count: 0,
                visible: false
            })
        );
    }

    #[test]
    fn test_wishlist_controls_only_update_existing() {
        let id = ProductId::from(42);
        let mut page = HeadlessPage::new("/").with_wishlist_control(&id, false);
        page.set_wishlist_state(&id, true);
        page.set_wishlist_state(&ProductId::from(1), true);
        assert_eq!(page.wishlist_control(&id), Some(true));
        assert_eq!(page.wishlist_control(&ProductId::from(1)), None);
    }

    #[test]
    fn test_is_cart_path() {
        assert!(is_cart_path("/cart/"));
        assert!(is_cart_path("/orders/cart/checkout"));
        assert!(!is_cart_path("/products/"));
    }
}
