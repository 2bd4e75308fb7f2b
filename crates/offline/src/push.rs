//! Push messages and the notifications they produce.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Title of every push notification.
pub const NOTIFICATION_TITLE: &str = "My Kanty";

/// Body used when the push carries no payload.
pub const DEFAULT_BODY: &str = "Nouvelle notification My Kanty";

pub const NOTIFICATION_ICON: &str = "/static/icons/icon-192x192.png";
pub const NOTIFICATION_BADGE: &str = "/static/icons/icon-96x96.png";

/// Action id that opens the site.
pub const ACTION_EXPLORE: &str = "explore";
/// Action id that only dismisses.
pub const ACTION_CLOSE: &str = "close";

/// An incoming push event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushMessage {
    pub data: Option<Bytes>,
}

impl PushMessage {
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            data: Some(Bytes::from(body.into())),
        }
    }
}

/// A button on the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Data attached to the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch, like `Date.now()`.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date_of_arrival: DateTime<Utc>,
    pub primary_key: u32,
}

/// Options passed to `showNotification`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl NotificationRequest {
    /// Build the notification for `message`, received at `now`.
    #[must_use]
    pub fn for_push(message: &PushMessage, now: DateTime<Utc>) -> Self {
        let body = message.data.as_ref().map_or_else(
            || DEFAULT_BODY.to_string(),
            |data| String::from_utf8_lossy(data).into_owned(),
        );

        let action = |id: &str, title: &str| NotificationAction {
            action: id.to_string(),
            title: title.to_string(),
            icon: NOTIFICATION_BADGE.to_string(),
        };

        Self {
            title: NOTIFICATION_TITLE.to_string(),
            body,
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_BADGE.to_string(),
            vibrate: vec![200, 100, 200],
            data: NotificationData {
                date_of_arrival: now,
                primary_key: 1,
            },
            actions: vec![action(ACTION_EXPLORE, "Voir"), action(ACTION_CLOSE, "Fermer")],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_payload_becomes_body() {
        let request = NotificationRequest::for_push(&PushMessage::text("Commande expédiée"), now());
        assert_eq!(request.title, "My Kanty");
        assert_eq!(request.body, "Commande expédiée");
    }

    #[test]
    fn test_default_body() {
        let request = NotificationRequest::for_push(&PushMessage::default(), now());
        assert_eq!(request.body, DEFAULT_BODY);
    }

    #[test]
    fn test_fixed_fields() {
        let request = NotificationRequest::for_push(&PushMessage::default(), now());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["icon"], "/static/icons/icon-192x192.png");
        assert_eq!(json["badge"], "/static/icons/icon-96x96.png");
        assert_eq!(json["vibrate"], serde_json::json!([200, 100, 200]));
        assert_eq!(json["data"]["primaryKey"], 1);
        assert_eq!(json["data"]["dateOfArrival"], 1_772_366_400_000_i64);
        assert_eq!(json["actions"][0]["action"], "explore");
        assert_eq!(json["actions"][0]["title"], "Voir");
        assert_eq!(json["actions"][1]["action"], "close");
        assert_eq!(json["actions"][1]["title"], "Fermer");
    }
}
