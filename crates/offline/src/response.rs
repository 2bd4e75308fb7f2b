//! Responses produced by the network or the cache.

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

/// A fully buffered response.
///
/// Buffering makes the response cheap to clone, which is what storing a
/// copy in the cache while returning the original requires.
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl WorkerResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Whether the response is eligible for the runtime cache.
    ///
    /// Only a 200 that carries no session cookie and is not marked
    /// `private` or `no-store` qualifies: the cache is shared by every
    /// client of the proxy.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK
            && !self.headers.contains_key(header::SET_COOKIE)
            && !self.is_private()
    }

    fn is_private(&self) -> bool {
        self.headers
            .get_all(header::CACHE_CONTROL)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .filter_map(|directive| directive.split('=').next())
            .map(str::trim)
            .any(|name| name.eq_ignore_ascii_case("private") || name.eq_ignore_ascii_case("no-store"))
    }

    /// The same response with every `Set-Cookie` header removed.
    #[must_use]
    pub fn without_cookies(mut self) -> Self {
        self.headers.remove(header::SET_COOKIE);
        self
    }
}

/// Headers that describe the connection rather than the resource.
const HOP_BY_HOP: [header::HeaderName; 4] = [
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::CONTENT_LENGTH,
    header::UPGRADE,
];

/// Copy end-to-end headers from `source`.
#[must_use]
pub fn end_to_end_headers(source: &HeaderMap) -> HeaderMap {
    let mut headers = source.clone();
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers
}

impl IntoResponse for WorkerResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = end_to_end_headers(&self.headers);
        response
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_only_200_is_cacheable() {
        assert!(WorkerResponse::new(StatusCode::OK, "x").is_cacheable());
        assert!(!WorkerResponse::new(StatusCode::NO_CONTENT, "").is_cacheable());
        assert!(!WorkerResponse::new(StatusCode::NOT_FOUND, "").is_cacheable());
    }

    #[test]
    fn test_private_responses_are_not_cacheable() {
        let with = |name: header::HeaderName, value: &'static str| {
            let mut response = WorkerResponse::new(StatusCode::OK, "x");
            response.headers.insert(name, HeaderValue::from_static(value));
            response
        };

        assert!(!with(header::SET_COOKIE, "sessionid=alice").is_cacheable());
        assert!(!with(header::CACHE_CONTROL, "private, max-age=0").is_cacheable());
        assert!(!with(header::CACHE_CONTROL, "No-Store").is_cacheable());
        assert!(!with(header::CACHE_CONTROL, "private=\"set-cookie\"").is_cacheable());
        assert!(with(header::CACHE_CONTROL, "public, max-age=600").is_cacheable());
    }

    #[test]
    fn test_without_cookies() {
        let mut response = WorkerResponse::new(StatusCode::OK, "x");
        response
            .headers
            .append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        response
            .headers
            .append(header::SET_COOKIE, HeaderValue::from_static("b=2"));
        response
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/css"));

        let stripped = response.without_cookies();
        assert!(stripped.headers.get(header::SET_COOKIE).is_none());
        assert_eq!(stripped.headers.len(), 1);
    }

    #[test]
    fn test_hop_by_hop_headers_are_stripped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

        let kept = end_to_end_headers(&headers);
        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key(header::CONTENT_TYPE));
    }
}
