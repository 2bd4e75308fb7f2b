//! Network access for the worker.
//!
//! Mirrors `fetch()`: a request that reaches a server resolves with whatever
//! status the server sent. Only transport failures (DNS, refused connection,
//! timeout) are errors. Redirects are not followed: a 3xx goes back to
//! the caller as is, like a navigation fetched with `redirect: "manual"`.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::header;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::request::FetchRequest;
use crate::response::{WorkerResponse, end_to_end_headers};

/// Transport failure.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network unavailable: {0}")]
    Unavailable(String),
}

/// Something that can perform a fetch.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform `request` against the network.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` only if no response was received.
    async fn fetch(&self, request: &FetchRequest) -> Result<WorkerResponse, NetworkError>;
}

/// Network access over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    /// Create a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::Http` if the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn fetch(&self, request: &FetchRequest) -> Result<WorkerResponse, NetworkError> {
        let mut headers = end_to_end_headers(&request.headers);
        headers.remove(header::HOST);

        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "Network response");

        Ok(WorkerResponse {
            status,
            headers,
            body,
        })
    }
}
