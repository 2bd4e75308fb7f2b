//! Offline controller and proxy configuration.
//!
//! # Environment Variables
//!
//! ## Required
//! - `OFFLINE_UPSTREAM` - Origin the worker controls (e.g., <https://mykanty.example>)
//!
//! ## Optional
//! - `OFFLINE_HOST` - Bind address (default: 127.0.0.1)
//! - `OFFLINE_PORT` - Listen port (default: 3001)
//! - `OFFLINE_CACHE_NAME` - Current cache generation (default: mykanty-v1)
//! - `OFFLINE_URL` - Offline fallback page (default: /offline/)
//! - `OFFLINE_PRECACHE` - Comma-separated paths cached on install
//! - `OFFLINE_IMAGE_HOSTS` - Comma-separated third-party image hosts (default: cloudinary.com)
//! - `OFFLINE_TIMEOUT_SECS` - Upstream request timeout (default: 30)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::request::FetchRequest;

/// Default cache generation name.
pub const DEFAULT_CACHE_NAME: &str = "mykanty-v1";

/// Default offline fallback page.
pub const DEFAULT_OFFLINE_URL: &str = "/offline/";

/// Pages and assets cached on install, besides the offline page.
pub const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/products/",
    "/services/",
    "/static/css/mobile-fix.css",
    "/static/icons/icon-192x192.png",
    "/static/icons/icon-512x512.png",
];

/// Third-party image host cached alongside same-origin requests.
pub const DEFAULT_IMAGE_HOST: &str = "cloudinary.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cache policy of the worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name of the live cache generation
    pub cache_name: String,
    /// Origin whose requests are intercepted
    pub origin: Url,
    /// Page served to navigations when offline and uncached
    pub offline_url: String,
    /// Paths cached on install; the offline page is always added
    pub precache: Vec<String>,
    /// Cross-origin hosts (substring match) that are still intercepted
    pub allowed_image_hosts: Vec<String>,
}

impl WorkerConfig {
    /// Default policy for `origin`.
    #[must_use]
    pub fn new(origin: Url) -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            origin,
            offline_url: DEFAULT_OFFLINE_URL.to_string(),
            precache: DEFAULT_PRECACHE.iter().map(ToString::to_string).collect(),
            allowed_image_hosts: vec![DEFAULT_IMAGE_HOST.to_string()],
        }
    }

    /// Absolute URL of the offline page.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the path cannot be joined to the origin.
    pub fn offline_page(&self) -> Result<Url, url::ParseError> {
        self.origin.join(&self.offline_url)
    }

    /// Requests issued on install: the manifest plus the offline page.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if an entry cannot be joined to the origin.
    pub fn precache_requests(&self) -> Result<Vec<FetchRequest>, url::ParseError> {
        let mut urls = Vec::with_capacity(self.precache.len() + 1);
        for path in &self.precache {
            let url = self.origin.join(path)?;
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        let offline = self.offline_page()?;
        if !urls.contains(&offline) {
            urls.push(offline);
        }
        Ok(urls.into_iter().map(FetchRequest::get).collect())
    }

    /// Whether a request to `url` is handled by the worker at all.
    #[must_use]
    pub fn is_in_scope(&self, url: &Url) -> bool {
        if url.origin() == self.origin.origin() {
            return true;
        }
        url.host_str().is_some_and(|host| {
            self.allowed_image_hosts
                .iter()
                .any(|allowed| host.contains(allowed.as_str()))
        })
    }
}

/// Proxy binary configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Timeout for upstream requests
    pub timeout: Duration,
    /// Worker policy; its origin is the upstream
    pub worker: WorkerConfig,
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = get_or_default(&lookup, "OFFLINE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("OFFLINE_HOST".to_string(), e.to_string()))?;
        let port = get_or_default(&lookup, "OFFLINE_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("OFFLINE_PORT".to_string(), e.to_string()))?;
        let timeout = get_or_default(&lookup, "OFFLINE_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("OFFLINE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let upstream = lookup("OFFLINE_UPSTREAM")
            .ok_or_else(|| ConfigError::MissingEnvVar("OFFLINE_UPSTREAM".to_string()))?;
        let origin = Url::parse(&upstream)
            .map_err(|e| ConfigError::InvalidEnvVar("OFFLINE_UPSTREAM".to_string(), e.to_string()))?;
        if origin.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "OFFLINE_UPSTREAM".to_string(),
                "URL cannot be a base".to_string(),
            ));
        }

        let mut worker = WorkerConfig::new(origin);
        if let Some(name) = lookup("OFFLINE_CACHE_NAME") {
            worker.cache_name = name;
        }
        if let Some(offline_url) = lookup("OFFLINE_URL") {
            worker.offline_url = offline_url;
        }
        if let Some(list) = lookup("OFFLINE_PRECACHE") {
            worker.precache = split_list(&list);
        }
        if let Some(list) = lookup("OFFLINE_IMAGE_HOSTS") {
            worker.allowed_image_hosts = split_list(&list);
        }

        // Fail early on entries that cannot become URLs.
        worker
            .precache_requests()
            .map_err(|e| ConfigError::InvalidEnvVar("OFFLINE_PRECACHE".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            timeout,
            worker,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn origin() -> Url {
        Url::parse("https://mykanty.example").unwrap()
    }

    fn proxy_config(vars: &[(&str, &str)]) -> Result<ProxyConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ProxyConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_manifest_includes_offline_page() {
        let config = WorkerConfig::new(origin());
        let urls: Vec<String> = config
            .precache_requests()
            .unwrap()
            .into_iter()
            .map(|r| r.url.path().to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "/",
                "/products/",
                "/services/",
                "/static/css/mobile-fix.css",
                "/static/icons/icon-192x192.png",
                "/static/icons/icon-512x512.png",
                "/offline/",
            ]
        );
    }

    #[test]
    fn test_offline_page_not_duplicated() {
        let mut config = WorkerConfig::new(origin());
        config.precache = vec!["/offline/".to_string(), "/".to_string()];
        assert_eq!(config.precache_requests().unwrap().len(), 2);
    }

    #[test]
    fn test_scope() {
        let config = WorkerConfig::new(origin());
        let url = |s: &str| Url::parse(s).unwrap();
        assert!(config.is_in_scope(&url("https://mykanty.example/products/")));
        assert!(config.is_in_scope(&url("https://res.cloudinary.com/demo/image.jpg")));
        assert!(!config.is_in_scope(&url("http://mykanty.example/")));
        assert!(!config.is_in_scope(&url("https://cdn.example.org/app.js")));
    }

    #[test]
    fn test_proxy_requires_upstream() {
        let err = proxy_config(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "OFFLINE_UPSTREAM"));
    }

    #[test]
    fn test_proxy_overrides() {
        let config = proxy_config(&[
            ("OFFLINE_UPSTREAM", "http://127.0.0.1:8000"),
            ("OFFLINE_PORT", "4000"),
            ("OFFLINE_CACHE_NAME", "mykanty-v2"),
            ("OFFLINE_PRECACHE", "/, /products/ ,"),
            ("OFFLINE_IMAGE_HOSTS", "cloudinary.com,imgix.net"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().port(), 4000);
        assert_eq!(config.worker.cache_name, "mykanty-v2");
        assert_eq!(config.worker.precache, vec!["/", "/products/"]);
        assert_eq!(config.worker.allowed_image_hosts.len(), 2);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_proxy_invalid_port() {
        let err = proxy_config(&[("OFFLINE_UPSTREAM", "http://127.0.0.1:8000"), ("OFFLINE_PORT", "x")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "OFFLINE_PORT"));
    }
}
