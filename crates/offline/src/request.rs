//! Requests seen by the fetch handler.

use axum::http::{HeaderMap, Method, header};
use bytes::Bytes;
use url::Url;

/// How the request was initiated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestMode {
    /// Top-level page navigation.
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

/// A request intercepted by the worker.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchRequest {
    /// A plain GET for `url`, as issued by `cache.addAll`.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            mode: RequestMode::NoCors,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A navigation GET for `url`.
    #[must_use]
    pub fn navigate(url: Url) -> Self {
        Self {
            mode: RequestMode::Navigate,
            ..Self::get(url)
        }
    }

    #[must_use]
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Cache key: the URL without its fragment.
    #[must_use]
    pub fn cache_key(&self) -> String {
        cache_key(&self.url)
    }
}

/// Cache key for `url`. Fragments never reach the server, so they are ignored.
#[must_use]
pub fn cache_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

/// Infer the request mode from headers sent by the browser.
///
/// `Sec-Fetch-Mode` wins when present. Older clients are treated as
/// navigating when they GET something that accepts HTML.
#[must_use]
pub fn infer_mode(method: &Method, headers: &HeaderMap) -> RequestMode {
    if let Some(mode) = headers.get("sec-fetch-mode").and_then(|v| v.to_str().ok()) {
        return match mode {
            "navigate" => RequestMode::Navigate,
            "same-origin" => RequestMode::SameOrigin,
            "cors" => RequestMode::Cors,
            _ => RequestMode::NoCors,
        };
    }

    let accepts_html = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"));

    if *method == Method::GET && accepts_html {
        RequestMode::Navigate
    } else {
        RequestMode::NoCors
    }
}
