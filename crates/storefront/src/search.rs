//! Search-as-you-type.
//!
//! Every keystroke cancels the lookup still waiting out its debounce. A
//! lookup whose request has already gone out runs to completion. Once the
//! trimmed query is at least [`MIN_QUERY_CHARS`] characters long, a lookup
//! is scheduled [`DEBOUNCE`] after the last keystroke. Results are logged and handed back
//! through the task handle; rendering them is left to the page.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};
use url::Url;

/// Path of the search endpoint, relative to the marketplace base URL.
pub const SEARCH_PATH: &str = "api/products/search/";

/// Delay between the last keystroke and the lookup.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Shortest query that triggers a lookup.
pub const MIN_QUERY_CHARS: usize = 3;

/// Errors from a product search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search endpoint returned HTTP {0}")]
    Status(u16),

    #[error("invalid search endpoint: {0}")]
    Url(#[from] url::ParseError),
}

/// Product search backend.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Run a query.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` if the backend cannot answer.
    async fn search(&self, query: &str) -> Result<serde_json::Value, SearchError>;
}

/// `GET /api/products/search/?q=<query>`.
#[derive(Debug, Clone)]
pub struct HttpProductSearch {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpProductSearch {
    /// # Errors
    ///
    /// Returns `SearchError::Url` if the endpoint cannot be derived from `base_url`.
    pub fn new(base_url: &Url) -> Result<Self, SearchError> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: base_url.join(SEARCH_PATH)?,
        })
    }

    /// Full request URL for `query`.
    #[must_use]
    pub fn url_for(&self, query: &str) -> String {
        format!("{}?q={}", self.endpoint, urlencoding::encode(query))
    }
}

#[async_trait]
impl ProductSearch for HttpProductSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<serde_json::Value, SearchError> {
        let response = self.client.get(self.url_for(query)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

/// A scheduled lookup.
pub type SearchTask = JoinHandle<Option<serde_json::Value>>;

/// A lookup plus the signal that cancels it during its debounce.
struct PendingSearch {
    task: SearchTask,
    cancel: Arc<Notify>,
}

/// Debouncer bound to one search input.
pub struct InstantSearch {
    backend: Arc<dyn ProductSearch>,
    pending: Option<PendingSearch>,
}

impl std::fmt::Debug for InstantSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstantSearch")
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl InstantSearch {
    #[must_use]
    pub fn new(backend: Arc<dyn ProductSearch>) -> Self {
        Self {
            backend,
            pending: None,
        }
    }

    /// Handle an `input` event with the field's current value.
    ///
    /// Returns `true` if a lookup was scheduled. Must be called from within
    /// a Tokio runtime when the query is long enough.
    pub fn on_input(&mut self, value: &str) -> bool {
        if let Some(previous) = self.pending.take() {
            // Stored as a permit, so a task that has not been polled yet still sees it.
            previous.cancel.notify_one();
        }

        let query = value.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return false;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available, skipping instant search");
            return false;
        };

        let backend = Arc::clone(&self.backend);
        let query = query.to_string();
        let cancel = Arc::new(Notify::new());
        let cancelled = Arc::clone(&cancel);
        let task = runtime.spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(DEBOUNCE) => {}
                () = cancelled.notified() => return None,
            }
            match backend.search(&query).await {
                Ok(results) => {
                    info!(%query, %results, "Instant search results");
                    Some(results)
                }
                Err(e) => {
                    error!(%query, error = %e, "Instant search failed");
                    None
                }
            }
        });
        self.pending = Some(PendingSearch { task, cancel });
        true
    }

    /// Take the most recently scheduled lookup, if any.
    ///
    /// Later input no longer cancels it.
    pub fn take_pending(&mut self) -> Option<SearchTask> {
        self.pending.take().map(|pending| pending.task)
    }
}
