//! Best-effort mirroring of the cart to the marketplace server.
//!
//! Local storage is authoritative. When the session is authenticated, each
//! cart mutation pushes the full cart snapshot to `POST /api/cart/sync/`;
//! the server keeps whatever arrives last. Pushes are never awaited by the
//! mutation, never retried, and a failure never rolls the local cart back.
//!
//! The push is spawned on the current Tokio runtime and its result is
//! exposed as a [`SyncHandle`], so callers that care (tests, the CLI) can
//! await it, while callers that drop it get fire-and-forget behaviour.

use std::sync::Arc;

use async_trait::async_trait;
use kanty_core::{Cart, CartItem};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};
use url::Url;

use crate::csrf::CSRF_HEADER;

/// Path of the sync endpoint, relative to the marketplace base URL.
pub const SYNC_PATH: &str = "api/cart/sync/";

/// Errors from a cart push.
#[derive(Debug, Error)]
pub enum SyncError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("sync endpoint returned HTTP {0}")]
    Status(u16),

    /// Server answered `{"success": false}`.
    #[error("server rejected cart sync")]
    Rejected(SyncAck),

    /// Response body was not the expected JSON.
    #[error("invalid sync response: {0}")]
    Decode(String),

    /// Endpoint URL could not be built.
    #[error("invalid sync endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// The push task was cancelled or panicked.
    #[error("sync task did not complete: {0}")]
    Aborted(String),
}

/// Server acknowledgement: `{ "success": bool, ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncAck {
    pub success: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Request body: `{ "cart": [...] }`.
#[derive(Debug, Serialize)]
struct SyncRequest<'a> {
    cart: &'a [CartItem],
}

/// Something that can receive a cart snapshot.
#[async_trait]
pub trait CartSyncer: Send + Sync {
    /// Push the full cart.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` on transport failure or a negative acknowledgement.
    async fn push(&self, cart: &Cart) -> Result<SyncAck, SyncError>;
}

// =============================================================================
// HttpCartSync
// =============================================================================

/// Cart sync over HTTP with the CSRF header.
#[derive(Clone)]
pub struct HttpCartSync {
    client: reqwest::Client,
    endpoint: Url,
    csrf_token: Option<SecretString>,
}

impl std::fmt::Debug for HttpCartSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCartSync")
            .field("endpoint", &self.endpoint.as_str())
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpCartSync {
    /// Create a sync client for the marketplace at `base_url`.
    ///
    /// Without a CSRF token the header is omitted, as the browser does when
    /// the cookie is missing.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Url` if the endpoint cannot be derived from `base_url`.
    pub fn new(base_url: &Url, csrf_token: Option<SecretString>) -> Result<Self, SyncError> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: base_url.join(SYNC_PATH)?,
            csrf_token,
        })
    }

    /// Sync endpoint URL.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CartSyncer for HttpCartSync {
    #[instrument(skip(self, cart), fields(endpoint = %self.endpoint, lines = cart.len()))]
    async fn push(&self, cart: &Cart) -> Result<SyncAck, SyncError> {
        let mut request = self.client.post(self.endpoint.clone()).json(&SyncRequest {
            cart: cart.items(),
        });
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let ack: SyncAck = response
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;

        if ack.success {
            debug!("Cart synchronized");
            Ok(ack)
        } else {
            Err(SyncError::Rejected(ack))
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Result of a push that runs in the background.
///
/// Dropping the handle does not cancel the push.
#[derive(Debug)]
pub struct SyncHandle {
    task: JoinHandle<Result<SyncAck, SyncError>>,
}

impl SyncHandle {
    /// Wait for the push to finish.
    ///
    /// # Errors
    ///
    /// Returns the push's `SyncError`, or `SyncError::Aborted` if the task died.
    pub async fn outcome(self) -> Result<SyncAck, SyncError> {
        self.task
            .await
            .map_err(|e| SyncError::Aborted(e.to_string()))?
    }

    /// Whether the push has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start a background push of `cart`.
///
/// Failures are logged here and never retried. Returns `None` when no Tokio
/// runtime is available to run the push.
pub fn spawn_sync(syncer: Arc<dyn CartSyncer>, cart: Cart) -> Option<SyncHandle> {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!("No async runtime available, skipping cart sync");
        return None;
    };

    let task = runtime.spawn(async move {
        let result = syncer.push(&cart).await;
        if let Err(e) = &result {
            error!(error = %e, "Cart synchronization failed");
        }
        result
    });

    Some(SyncHandle { task })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use kanty_core::ProductId;
    use rust_decimal::Decimal;

    use super::*;

    #[derive(Default)]
    struct RecordingSyncer {
        pushed: Mutex<Vec<Cart>>,
        fail: bool,
    }

    #[async_trait]
    impl CartSyncer for RecordingSyncer {
        async fn push(&self, cart: &Cart) -> Result<SyncAck, SyncError> {
            self.pushed.lock().unwrap().push(cart.clone());
            if self.fail {
                return Err(SyncError::Status(500));
            }
            Ok(SyncAck {
                success: true,
                extra: serde_json::Map::new(),
            })
        }
    }

    #[test]
    fn test_endpoint_joins_base() {
        let base = Url::parse("https://mykanty.example/").unwrap();
        let sync = HttpCartSync::new(&base, None).unwrap();
        assert_eq!(
            sync.endpoint().as_str(),
            "https://mykanty.example/api/cart/sync/"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let base = Url::parse("https://mykanty.example/").unwrap();
        let sync = HttpCartSync::new(&base, Some(SecretString::from("tok-secret"))).unwrap();
        let debug = format!("{sync:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tok-secret"));
    }

    #[test]
    fn test_request_body_shape() {
        let mut cart = Cart::new();
        cart.add(ProductId::from(7), "Shirt", Decimal::from(2500), "/img/7.png");
        let body = serde_json::to_value(SyncRequest { cart: cart.items() }).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "cart": [{"id": 7, "name": "Shirt", "price": 2500, "image": "/img/7.png", "quantity": 1}]
            })
        );
    }

    #[test]
    fn test_ack_keeps_extra_fields() {
        let ack: SyncAck =
            serde_json::from_str(r#"{"success": true, "items": 3}"#).unwrap();
        assert!(ack.success);
        assert_eq!(ack.extra.get("items"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn test_spawn_without_runtime_is_skipped() {
        let syncer = Arc::new(RecordingSyncer::default());
        assert!(spawn_sync(syncer.clone(), Cart::new()).is_none());
        assert!(syncer.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spawned_push_reports_outcome() {
        let syncer = Arc::new(RecordingSyncer::default());
        let handle = spawn_sync(syncer.clone(), Cart::new()).unwrap();
        assert!(handle.outcome().await.unwrap().success);
        assert_eq!(syncer.pushed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_push_failure_is_returned_not_raised() {
        let syncer = Arc::new(RecordingSyncer {
            fail: true,
            ..RecordingSyncer::default()
        });
        let handle = spawn_sync(syncer, Cart::new()).unwrap();
        assert!(matches!(handle.outcome().await, Err(SyncError::Status(500))));
    }
}
