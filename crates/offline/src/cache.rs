//! Named cache generations, modelled on the Cache Storage API.
//!
//! Each generation is an unbounded `moka` cache keyed by request URL, so an
//! entry stays until it is overwritten or its generation is deleted.
//! Generations are kept in creation order so [`CacheStorage::match_any`] searches them the
//! way `caches.match()` does.

use std::sync::Arc;

use moka::future::Cache;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::network::{Network, NetworkError};
use crate::request::{FetchRequest, cache_key};
use crate::response::WorkerResponse;

/// Errors from populating a cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A manifest URL could not be fetched.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: NetworkError,
    },

    /// A manifest URL answered with a non-2xx status.
    #[error("failed to fetch {url}: HTTP {status}")]
    BadStatus { url: String, status: u16 },
}

// =============================================================================
// NamedCache
// =============================================================================

/// One cache generation.
#[derive(Clone)]
pub struct NamedCache {
    name: Arc<str>,
    entries: Cache<String, WorkerResponse>,
}

impl std::fmt::Debug for NamedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedCache")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl NamedCache {
    fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            entries: Cache::builder().build(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store `response` under `key`, replacing any previous entry.
    ///
    /// `Set-Cookie` is never stored.
    pub async fn put(&self, key: String, response: WorkerResponse) {
        self.entries.insert(key, response.without_cookies()).await;
    }

    /// Look up `key`.
    pub async fn get(&self, key: &str) -> Option<WorkerResponse> {
        self.entries.get(key).await
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys currently stored.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|(k, _)| (*k).clone()).collect();
        keys.sort();
        keys
    }

    /// Fetch every request and store all responses, or none of them.
    ///
    /// Nothing is written until every fetch has succeeded with a 2xx status.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` for the first request that fails.
    #[instrument(skip(self, network, requests), fields(cache = %self.name, count = requests.len()))]
    pub async fn add_all(
        &self,
        network: &dyn Network,
        requests: &[FetchRequest],
    ) -> Result<(), CacheError> {
        let mut staged = Vec::with_capacity(requests.len());
        for request in requests {
            let url = request.cache_key();
            let response = network
                .fetch(request)
                .await
                .map_err(|source| CacheError::Fetch {
                    url: url.clone(),
                    source,
                })?;
            if !response.status.is_success() {
                return Err(CacheError::BadStatus {
                    url,
                    status: response.status.as_u16(),
                });
            }
            staged.push((url, response));
        }

        for (url, response) in staged {
            self.put(url, response).await;
        }
        debug!("Cache populated");
        Ok(())
    }
}

// =============================================================================
// CacheStorage
// =============================================================================

/// The origin's set of named caches.
#[derive(Clone, Default)]
pub struct CacheStorage {
    generations: Arc<RwLock<Vec<NamedCache>>>,
}

impl std::fmt::Debug for CacheStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStorage").finish_non_exhaustive()
    }
}

impl CacheStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the cache called `name`, creating it if absent.
    pub async fn open(&self, name: &str) -> NamedCache {
        if let Some(cache) = self.find(name).await {
            return cache;
        }

        let mut generations = self.generations.write().await;
        // Another task may have created it between the two locks.
        if let Some(cache) = generations.iter().find(|c| c.name() == name) {
            return cache.clone();
        }
        let cache = NamedCache::new(name);
        generations.push(cache.clone());
        debug!(cache = name, "Cache created");
        cache
    }

    /// Names of all caches, in creation order.
    pub async fn keys(&self) -> Vec<String> {
        self.generations
            .read()
            .await
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub async fn has(&self, name: &str) -> bool {
        self.find(name).await.is_some()
    }

    /// Delete the cache called `name`. Returns whether it existed.
    pub async fn delete(&self, name: &str) -> bool {
        let removed = {
            let mut generations = self.generations.write().await;
            let before = generations.len();
            generations.retain(|c| c.name() != name);
            before != generations.len()
        };
        if removed {
            debug!(cache = name, "Cache deleted");
        }
        removed
    }

    /// Look up `key` in the cache called `name` only.
    pub async fn match_in(&self, name: &str, key: &str) -> Option<WorkerResponse> {
        self.find(name).await?.get(key).await
    }

    /// Look up `key` in every cache, oldest first.
    pub async fn match_any(&self, key: &str) -> Option<WorkerResponse> {
        let generations = self.generations.read().await.clone();
        for cache in generations {
            if let Some(hit) = cache.get(key).await {
                return Some(hit);
            }
        }
        None
    }

    /// Look up `request` in every cache.
    pub async fn match_request(&self, request: &FetchRequest) -> Option<WorkerResponse> {
        self.match_any(&cache_key(&request.url)).await
    }

    async fn find(&self, name: &str) -> Option<NamedCache> {
        self.generations
            .read()
            .await
            .iter()
            .find(|c| c.name() == name)
            .cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use url::Url;

    use super::*;

    struct StaticNetwork {
        routes: HashMap<String, StatusCode>,
    }

    #[async_trait]
    impl Network for StaticNetwork {
        async fn fetch(&self, request: &FetchRequest) -> Result<WorkerResponse, NetworkError> {
            match self.routes.get(request.url.path()) {
                Some(status) => Ok(WorkerResponse::new(*status, request.url.path().to_string())),
                None => Err(NetworkError::Unavailable("offline".to_string())),
            }
        }
    }

    fn requests(paths: &[&str]) -> Vec<FetchRequest> {
        let origin = Url::parse("https://mykanty.example/").unwrap();
        paths
            .iter()
            .map(|p| FetchRequest::get(origin.join(p).unwrap()))
            .collect()
    }

    fn network(routes: &[(&str, StatusCode)]) -> StaticNetwork {
        StaticNetwork {
            routes: routes
                .iter()
                .map(|(p, s)| ((*p).to_string(), *s))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let storage = CacheStorage::new();
        storage.open("v1").await;
        storage.open("v2").await;
        storage.open("v1").await;
        assert_eq!(storage.keys().await, vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = CacheStorage::new();
        storage.open("v1").await;
        assert!(storage.delete("v1").await);
        assert!(!storage.delete("v1").await);
        assert!(!storage.has("v1").await);
    }

    #[tokio::test]
    async fn test_match_any_prefers_oldest_generation() {
        let storage = CacheStorage::new();
        let old = storage.open("old").await;
        let new = storage.open("new").await;
        old.put("k".to_string(), WorkerResponse::new(StatusCode::OK, "old")).await;
        new.put("k".to_string(), WorkerResponse::new(StatusCode::OK, "new")).await;

        assert_eq!(storage.match_any("k").await.unwrap().body, "old");
        assert_eq!(storage.match_in("new", "k").await.unwrap().body, "new");
        assert!(storage.match_in("missing", "k").await.is_none());
    }

    #[tokio::test]
    async fn test_add_all_stores_every_url() {
        let storage = CacheStorage::new();
        let cache = storage.open("v1").await;
        let net = network(&[("/", StatusCode::OK), ("/offline/", StatusCode::OK)]);

        cache.add_all(&net, &requests(&["/", "/offline/"])).await.unwrap();
        assert_eq!(
            cache.keys(),
            vec![
                "https://mykanty.example/".to_string(),
                "https://mykanty.example/offline/".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_add_all_is_all_or_nothing() {
        let storage = CacheStorage::new();
        let cache = storage.open("v1").await;

        let net = network(&[("/", StatusCode::OK)]);
        let err = cache
            .add_all(&net, &requests(&["/", "/offline/"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Fetch { .. }));
        assert!(!cache.contains("https://mykanty.example/"));

        let net = network(&[("/", StatusCode::OK), ("/offline/", StatusCode::NOT_FOUND)]);
        let err = cache
            .add_all(&net, &requests(&["/", "/offline/"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::BadStatus { status: 404, .. }));
        assert!(cache.keys().is_empty());
    }

    #[tokio::test]
    async fn test_entries_are_never_evicted() {
        let storage = CacheStorage::new();
        let cache = storage.open("v1").await;
        let net = network(&[("/", StatusCode::OK), ("/offline/", StatusCode::OK)]);
        cache.add_all(&net, &requests(&["/", "/offline/"])).await.unwrap();

        for i in 0..20_000 {
            cache
                .put(
                    format!("https://mykanty.example/products/{i}/"),
                    WorkerResponse::new(StatusCode::OK, "product"),
                )
                .await;
        }
        cache.entries.run_pending_tasks().await;

        assert!(storage.match_any("https://mykanty.example/").await.is_some());
        assert!(storage.match_any("https://mykanty.example/offline/").await.is_some());
        for i in [0, 9_999, 10_000, 19_999] {
            let key = format!("https://mykanty.example/products/{i}/");
            assert!(storage.match_any(&key).await.is_some(), "{key} evicted");
        }
        assert_eq!(cache.keys().len(), 20_002);
    }

    #[tokio::test]
    async fn test_put_drops_set_cookie() {
        let storage = CacheStorage::new();
        let cache = storage.open("v1").await;
        let mut response = WorkerResponse::new(StatusCode::OK, "home");
        response.headers.insert(
            axum::http::header::SET_COOKIE,
            axum::http::HeaderValue::from_static("csrftoken=abc"),
        );
        response.headers.insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("text/html"),
        );

        cache.put("k".to_string(), response).await;
        let stored = cache.get("k").await.unwrap();
        assert!(!stored.headers.contains_key(axum::http::header::SET_COOKIE));
        assert!(stored.headers.contains_key(axum::http::header::CONTENT_TYPE));
    }
}
