//! HTTP front end that runs the worker in front of an upstream site.
//!
//! Every request is turned into a [`FetchRequest`] against the upstream
//! origin and offered to the worker. Requests it does not intercept are
//! forwarded untouched; intercepted ones get the worker's answer, or
//! `504 Gateway Timeout` when it has none.

use axum::Router;
use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::request::{FetchRequest, infer_mode};
use crate::worker::{FetchOutcome, OfflineWorker};

/// Largest request body forwarded upstream.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the proxy router.
pub fn router(worker: OfflineWorker) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(handle)
        .with_state(worker)
        .layer(TraceLayer::new_for_http())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn handle(State(worker): State<OfflineWorker>, request: Request) -> Response {
    let request = match to_fetch_request(&worker, request).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    match worker.fetch(&request).await {
        FetchOutcome::Responded(response) => response.into_response(),
        FetchOutcome::Unresolved => StatusCode::GATEWAY_TIMEOUT.into_response(),
        FetchOutcome::Bypass => match worker.network().fetch(&request).await {
            Ok(response) => response.into_response(),
            Err(e) => {
                error!(error = %e, url = %request.url, "Upstream request failed");
                StatusCode::BAD_GATEWAY.into_response()
            }
        },
    }
}

async fn to_fetch_request(
    worker: &OfflineWorker,
    request: Request,
) -> Result<FetchRequest, Response> {
    let (parts, body) = request.into_parts();

    // Only the path and query are taken from the client; the authority is
    // always the upstream's.
    let mut url = worker.config().origin.clone();
    url.set_path(parts.uri.path());
    url.set_query(parts.uri.query());

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE.into_response())?;

    Ok(FetchRequest {
        mode: infer_mode(&parts.method, &parts.headers),
        method: parts.method,
        url,
        headers: parts.headers,
        body,
    })
}
