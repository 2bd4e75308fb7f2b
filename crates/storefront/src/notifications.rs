//! Dismissible notification banners.
//!
//! Banners stack in a container that is created the first time something is
//! shown. Each banner expires five seconds after it appears unless closed
//! first. Server-rendered alerts are adopted into the same container so they
//! follow the same rules.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time a banner stays up before it is removed automatically.
pub const AUTO_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Banner severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl NotificationKind {
    /// Icon glyph shown next to the message.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "check-circle",
            Self::Error => "exclamation-circle",
            Self::Warning => "exclamation-triangle",
            Self::Info => "info-circle",
        }
    }

    /// CSS class applied to the banner (`alert alert-<kind>`).
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Error => "alert-error",
            Self::Warning => "alert-warning",
            Self::Info => "alert-info",
        }
    }
}

/// Identifier of a banner in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(Uuid);

/// A banner currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    pub shown_at: Instant,
}

impl Notification {
    /// Whether the banner has outlived [`AUTO_DISMISS_AFTER`] at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= AUTO_DISMISS_AFTER
    }
}

/// The messages container.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    // `None` until the first banner creates the container.
    container: Option<Vec<Notification>>,
}

impl NotificationCenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a banner now.
    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        self.show_at(message, kind, Instant::now())
    }

    /// Show a banner as if it appeared at `shown_at`.
    ///
    /// Banners already expired at `shown_at` are removed first.
    pub fn show_at(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        shown_at: Instant,
    ) -> NotificationId {
        self.sweep(shown_at);
        let id = NotificationId(Uuid::new_v4());
        let message = message.into();
        tracing::debug!(kind = ?kind, %message, "Notification shown");
        self.container.get_or_insert_with(Vec::new).push(Notification {
            id,
            message,
            kind,
            shown_at,
        });
        id
    }

    /// Take over an alert rendered by the server so it expires like ours.
    pub fn adopt_alert(&mut self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        self.show(message, kind)
    }

    /// Close a banner. Returns `false` if it is already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let Some(container) = self.container.as_mut() else {
            return false;
        };
        let before = container.len();
        container.retain(|n| n.id != id);
        container.len() != before
    }

    /// Remove every banner that has expired at `now`. Returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let Some(container) = self.container.as_mut() else {
            return 0;
        };
        let before = container.len();
        container.retain(|n| !n.is_expired(now));
        before - container.len()
    }

    /// Banners still on screen now, in arrival order.
    #[must_use]
    pub fn visible(&self) -> Vec<&Notification> {
        self.visible_at(Instant::now())
    }

    /// Banners still on screen at `now`, in arrival order.
    #[must_use]
    pub fn visible_at(&self, now: Instant) -> Vec<&Notification> {
        self.container
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|n| !n.is_expired(now))
            .collect()
    }

    /// Whether the container element has been created.
    #[must_use]
    pub const fn has_container(&self) -> bool {
        self.container.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_icons() {
        assert_eq!(NotificationKind::Success.icon(), "check-circle");
        assert_eq!(NotificationKind::Error.icon(), "exclamation-circle");
        assert_eq!(NotificationKind::Warning.icon(), "exclamation-triangle");
        assert_eq!(NotificationKind::Info.icon(), "info-circle");
    }

    #[test]
    fn test_container_created_lazily() {
        let mut center = NotificationCenter::new();
        assert!(!center.has_container());
        assert_eq!(center.sweep(Instant::now()), 0);
        center.show("Bonjour", NotificationKind::Info);
        assert!(center.has_container());
    }

    #[test]
    fn test_banners_stack_in_arrival_order() {
        let mut center = NotificationCenter::new();
        center.show("first", NotificationKind::Success);
        center.show("second", NotificationKind::Error);
        center.adopt_alert("third", NotificationKind::Warning);
        let messages: Vec<_> = center.visible().iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_dismiss() {
        let mut center = NotificationCenter::new();
        let keep = center.show("keep", NotificationKind::Info);
        let close = center.show("close", NotificationKind::Info);
        assert!(center.dismiss(close));
        assert!(!center.dismiss(close));
        assert_eq!(center.visible().len(), 1);
        assert_eq!(center.visible()[0].id, keep);
    }

    #[test]
    fn test_expired_banners_disappear_without_sweep() {
        let now = Instant::now();
        let mut center = NotificationCenter::new();
        let ago = |secs| now.checked_sub(Duration::from_secs(secs)).unwrap();
        center.show_at("stale", NotificationKind::Info, ago(8));
        center.show_at("fresh", NotificationKind::Info, ago(4));
        assert_eq!(center.container.as_ref().map(Vec::len), Some(2));

        let visible = center.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "fresh");
        assert!(center.visible_at(now + Duration::from_secs(2)).is_empty());
    }

    #[test]
    fn test_showing_a_banner_drops_expired_ones() {
        let start = Instant::now();
        let mut center = NotificationCenter::new();
        center.show_at("old", NotificationKind::Info, start);
        center.show_at("new", NotificationKind::Info, start + Duration::from_secs(60));

        assert_eq!(center.container.as_ref().map(Vec::len), Some(1));
        assert_eq!(center.visible_at(start + Duration::from_secs(61))[0].message, "new");
    }

    #[test]
    fn test_sweep_after_five_seconds() {
        let start = Instant::now();
        let mut center = NotificationCenter::new();
        center.show_at("old", NotificationKind::Info, start);
        center.show_at("new", NotificationKind::Info, start + Duration::from_secs(3));

        assert_eq!(center.sweep(start + Duration::from_millis(4_999)), 0);
        assert_eq!(center.sweep(start + Duration::from_secs(5)), 1);
        assert_eq!(center.visible()[0].message, "new");
        assert_eq!(center.sweep(start + Duration::from_secs(8)), 1);
        assert!(center.visible().is_empty());
    }
}
