//! The offline cache controller.
//!
//! [`OfflineWorker`] handles the events a service worker receives. Each
//! handler returns a future; the caller keeps the worker alive until it
//! resolves, which is the contract `event.waitUntil()` expresses in a
//! browser.
//!
//! Fetch policy is network-first: a 200 from the network is returned and
//! stored, a transport failure falls back to any cached copy, and a
//! navigation with neither gets the pre-cached offline page.

use std::sync::Arc;

use axum::http::Method;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::cache::{CacheError, CacheStorage};
use crate::config::WorkerConfig;
use crate::host::{NotificationId, WorkerHost};
use crate::lifecycle::{Transition, WorkerState};
use crate::network::Network;
use crate::push::{ACTION_EXPLORE, NotificationRequest, PushMessage};
use crate::request::{FetchRequest, cache_key};
use crate::response::WorkerResponse;

/// Errors from lifecycle events.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("cannot {transition:?} while {state}")]
    InvalidState {
        state: WorkerState,
        transition: Transition,
    },

    #[error("install failed: {0}")]
    Install(#[from] CacheError),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result of a fetch event.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not intercepted; the request goes to the network untouched.
    Bypass,
    /// The worker answered.
    Responded(WorkerResponse),
    /// Intercepted, but neither network nor cache had an answer.
    Unresolved,
}

/// A click on a shown notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationClick {
    pub notification: NotificationId,
    /// Action button id, `None` for a click on the body.
    pub action: Option<String>,
}

/// Events delivered to the worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(FetchRequest),
    Push(PushMessage),
    NotificationClick(NotificationClick),
    /// The worker was replaced or shut down.
    Terminate,
}

/// What handling an event produced.
#[derive(Debug, Clone)]
pub enum EventResult {
    Installed,
    Activated { deleted: Vec<String> },
    Fetch(FetchOutcome),
    Notified(NotificationId),
    ClickHandled { opened_window: bool },
    Terminated,
}

// =============================================================================
// OfflineWorker
// =============================================================================

/// Offline cache controller for one origin.
#[derive(Clone)]
pub struct OfflineWorker {
    inner: Arc<OfflineWorkerInner>,
}

struct OfflineWorkerInner {
    config: WorkerConfig,
    caches: CacheStorage,
    network: Arc<dyn Network>,
    host: Arc<dyn WorkerHost>,
    state: RwLock<WorkerState>,
}

impl std::fmt::Debug for OfflineWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineWorker")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl OfflineWorker {
    /// Create a worker in the `Parsed` state.
    #[must_use]
    pub fn new(
        config: WorkerConfig,
        caches: CacheStorage,
        network: Arc<dyn Network>,
        host: Arc<dyn WorkerHost>,
    ) -> Self {
        Self {
            inner: Arc::new(OfflineWorkerInner {
                config,
                caches,
                network,
                host,
                state: RwLock::new(WorkerState::Parsed),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WorkerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn caches(&self) -> &CacheStorage {
        &self.inner.caches
    }

    #[must_use]
    pub fn network(&self) -> &Arc<dyn Network> {
        &self.inner.network
    }

    pub async fn state(&self) -> WorkerState {
        *self.inner.state.read().await
    }

    /// Dispatch one event.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError` if a lifecycle event fails.
    pub async fn handle(&self, event: WorkerEvent) -> Result<EventResult, WorkerError> {
        match event {
            WorkerEvent::Install => self.install().await.map(|()| EventResult::Installed),
            WorkerEvent::Activate => self
                .activate()
                .await
                .map(|deleted| EventResult::Activated { deleted }),
            WorkerEvent::Fetch(request) => Ok(EventResult::Fetch(self.fetch(&request).await)),
            WorkerEvent::Push(message) => Ok(EventResult::Notified(self.push(&message).await)),
            WorkerEvent::NotificationClick(click) => Ok(EventResult::ClickHandled {
                opened_window: self.notification_click(&click).await,
            }),
            WorkerEvent::Terminate => self.terminate().await.map(|()| EventResult::Terminated),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Populate the current generation with the precache manifest.
    ///
    /// Either every manifest URL is stored or the worker becomes redundant
    /// and a generation created by this install is removed again.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::Install` if any manifest URL fails.
    #[instrument(skip(self), fields(cache = %self.inner.config.cache_name))]
    pub async fn install(&self) -> Result<(), WorkerError> {
        self.transition(Transition::BeginInstall).await?;
        info!("Installing");

        let cache_name = &self.inner.config.cache_name;
        let existed = self.inner.caches.has(cache_name).await;

        if let Err(e) = self.precache().await {
            error!(error = %e, "Install failed");
            if !existed {
                self.inner.caches.delete(cache_name).await;
            }
            self.transition(Transition::Discard).await?;
            return Err(e);
        }

        self.transition(Transition::FinishInstall).await?;
        debug!("Skipping waiting");
        Ok(())
    }

    async fn precache(&self) -> Result<(), WorkerError> {
        let requests = self.inner.config.precache_requests()?;
        let cache = self.inner.caches.open(&self.inner.config.cache_name).await;
        cache
            .add_all(self.inner.network.as_ref(), &requests)
            .await?;
        Ok(())
    }

    /// Drop every other cache generation and take control of open pages.
    ///
    /// Returns the names of the deleted generations.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::InvalidState` unless the worker is installed.
    #[instrument(skip(self), fields(cache = %self.inner.config.cache_name))]
    pub async fn activate(&self) -> Result<Vec<String>, WorkerError> {
        self.transition(Transition::BeginActivate).await?;
        info!("Activating");

        let current = &self.inner.config.cache_name;
        let mut deleted = Vec::new();
        for name in self.inner.caches.keys().await {
            if name != *current && self.inner.caches.delete(&name).await {
                info!(cache = %name, "Deleted stale cache");
                deleted.push(name);
            }
        }

        self.transition(Transition::FinishActivate).await?;
        self.inner.host.claim_clients().await;
        Ok(deleted)
    }

    /// Mark the worker redundant.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches the other lifecycle steps.
    pub async fn terminate(&self) -> Result<(), WorkerError> {
        self.transition(Transition::Discard).await.map(|_| ())
    }

    async fn transition(&self, transition: Transition) -> Result<WorkerState, WorkerError> {
        let mut state = self.inner.state.write().await;
        let next = state
            .next(transition)
            .ok_or(WorkerError::InvalidState {
                state: *state,
                transition,
            })?;
        debug!(from = %*state, to = %next, "Worker state changed");
        *state = next;
        Ok(next)
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Whether `request` is intercepted at all.
    pub async fn intercepts(&self, request: &FetchRequest) -> bool {
        self.state().await.controls_fetches()
            && request.method == Method::GET
            && self.inner.config.is_in_scope(&request.url)
    }

    /// Network-first fetch with cache and offline-page fallback.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        if !self.intercepts(request).await {
            return FetchOutcome::Bypass;
        }

        match self.inner.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    let cache = self.inner.caches.open(&self.inner.config.cache_name).await;
                    cache.put(request.cache_key(), response.clone()).await;
                    debug!("Cached network response");
                }
                FetchOutcome::Responded(response)
            }
            Err(e) => {
                warn!(error = %e, "Network failed, falling back to cache");
                self.fallback(request).await
            }
        }
    }

    async fn fallback(&self, request: &FetchRequest) -> FetchOutcome {
        if let Some(hit) = self.inner.caches.match_request(request).await {
            debug!("Served from cache");
            return FetchOutcome::Responded(hit);
        }

        if request.is_navigation()
            && let Ok(offline) = self.inner.config.offline_page()
            && let Some(page) = self.inner.caches.match_any(&cache_key(&offline)).await
        {
            info!("Served offline page");
            return FetchOutcome::Responded(page);
        }

        debug!("No cached response");
        FetchOutcome::Unresolved
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Show the notification for a push message.
    pub async fn push(&self, message: &PushMessage) -> NotificationId {
        let request = NotificationRequest::for_push(message, Utc::now());
        self.inner.host.show_notification(&request).await
    }

    /// Close the clicked notification and open the site for `explore`.
    ///
    /// Returns whether a window was opened.
    pub async fn notification_click(&self, click: &NotificationClick) -> bool {
        self.inner.host.close_notification(click.notification).await;

        if click.action.as_deref() == Some(ACTION_EXPLORE) {
            self.inner.host.open_window("/").await;
            true
        } else {
            false
        }
    }
}
