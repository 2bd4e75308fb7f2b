//! Integration test harness for the My Kanty client crates.
//!
//! Tests run against an in-process fake of the marketplace backend served
//! on an ephemeral port, so no external services are needed:
//!
//! ```bash
//! cargo test -p kanty-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use kanty_offline::{FetchRequest, HttpNetwork, Network, NetworkError, WorkerResponse};
use serde_json::{Value, json};
use url::Url;

/// Serve `router` on an ephemeral local port and return its base URL.
///
/// # Panics
///
/// Panics if no local port can be bound.
#[allow(clippy::unwrap_used)]
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// A base URL nothing listens on.
///
/// # Panics
///
/// Panics if no local port can be bound.
#[allow(clippy::unwrap_used)]
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/")).unwrap()
}

// =============================================================================
// Fake marketplace
// =============================================================================

/// A cart push as the server received it.
#[derive(Debug, Clone)]
pub struct RecordedSync {
    pub csrf_token: Option<String>,
    pub body: Value,
}

/// In-process stand-in for the marketplace backend.
#[derive(Debug, Clone, Default)]
pub struct FakeMarketplace {
    inner: Arc<FakeMarketplaceInner>,
}

#[derive(Debug, Default)]
struct FakeMarketplaceInner {
    syncs: Mutex<Vec<RecordedSync>>,
    searches: Mutex<Vec<String>>,
    reject_sync: AtomicBool,
}

impl FakeMarketplace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer cart pushes with `{"success": false}` from now on.
    pub fn reject_syncs(&self) {
        self.inner.reject_sync.store(true, Ordering::SeqCst);
    }

    /// Cart pushes received so far.
    #[must_use]
    pub fn syncs(&self) -> Vec<RecordedSync> {
        self.inner
            .syncs
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Search queries received so far.
    #[must_use]
    pub fn searches(&self) -> Vec<String> {
        self.inner
            .searches
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Routes: the two JSON endpoints plus the pages the offline worker caches.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/cart/sync/", post(sync_cart))
            .route("/api/products/search/", get(search_products))
            .route("/", get(|| page("Accueil")))
            .route("/products/", get(|| page("Produits")))
            .route("/products/{id}/", get(product_page))
            .route("/services/", get(|| page("Services")))
            .route("/login/", post(login))
            .route("/account/", get(|| page("Mon compte")))
            .route("/orders/", get(orders))
            .route("/offline/", get(|| page("Hors ligne")))
            .route("/static/css/mobile-fix.css", get(stylesheet))
            .route("/static/icons/{file}", get(icon))
            .with_state(self.clone())
    }

    /// Start the fake on an ephemeral port and return its base URL.
    pub async fn start(&self) -> Url {
        serve(self.router()).await
    }
}

async fn sync_cart(
    State(market): State<FakeMarketplace>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let csrf_token = headers
        .get("x-csrftoken")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    if let Ok(mut syncs) = market.inner.syncs.lock() {
        syncs.push(RecordedSync { csrf_token, body });
    }

    if market.inner.reject_sync.load(Ordering::SeqCst) {
        Json(json!({ "success": false, "error": "Panier invalide" }))
    } else {
        Json(json!({ "success": true }))
    }
}

async fn search_products(
    State(market): State<FakeMarketplace>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let query = params.get("q").cloned().unwrap_or_default();
    if let Ok(mut searches) = market.inner.searches.lock() {
        searches.push(query.clone());
    }
    Json(json!({
        "query": query,
        "results": [{ "id": 1, "name": "Robe wax", "price": 15000 }]
    }))
}

async fn page(title: &str) -> Html<String> {
    Html(format!("<html><title>{title}</title></html>"))
}

/// Sign in: redirect to the account page with a fresh session cookie.
async fn login() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/account/"),
            (header::SET_COOKIE, "sessionid=abc; Path=/; HttpOnly"),
        ],
    )
}

/// A per-user page that refreshes the caller's session cookie.
async fn orders(headers: HeaderMap) -> impl IntoResponse {
    let session = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonyme")
        .to_string();
    (
        [
            (header::SET_COOKIE, session.clone()),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
        ],
        Html(format!("<html><title>Commandes de {session}</title></html>")),
    )
}

async fn product_page(Path(id): Path<String>) -> Html<String> {
    Html(format!("<html><title>Produit {id}</title></html>"))
}

async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], "body { margin: 0; }")
}

async fn icon(Path(file): Path<String>) -> impl IntoResponse {
    if file.ends_with(".png") {
        ([(header::CONTENT_TYPE, "image/png")], file).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

// =============================================================================
// Switchable network
// =============================================================================

/// Real HTTP network that can be cut off, like a device going offline.
#[derive(Debug)]
pub struct SwitchableNetwork {
    inner: HttpNetwork,
    offline: AtomicBool,
}

impl SwitchableNetwork {
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[allow(clippy::unwrap_used)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: HttpNetwork::new(Duration::from_secs(5)).unwrap(),
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl Default for SwitchableNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Network for SwitchableNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<WorkerResponse, NetworkError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::Unavailable("device offline".to_string()));
        }
        self.inner.fetch(request).await
    }
}
