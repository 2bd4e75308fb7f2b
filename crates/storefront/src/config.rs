//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `KANTY_BASE_URL` - Marketplace origin (default: <http://127.0.0.1:8000>)
//! - `KANTY_STORAGE_DIR` - Directory for persisted cart/wishlist (default: .kanty)
//! - `KANTY_AUTHENTICATED` - Whether the session is logged in (default: false)
//! - `KANTY_CSRF_TOKEN` - Value of the `csrftoken` cookie, sent with cart syncs
//! - `KANTY_COOKIE` - Session `Cookie` header; its `csrftoken` is used when
//!   `KANTY_CSRF_TOKEN` is unset
//! - `KANTY_PAGE_PATH` - Current page path (default: /)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::csrf::{CSRF_COOKIE, cookie_value};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_STORAGE_DIR: &str = ".kanty";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Implements `Debug` manually to redact the CSRF token.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Marketplace origin; API paths are joined onto it
    pub base_url: Url,
    /// Where `cart.json` and `wishlist.json` live
    pub storage_dir: PathBuf,
    /// Session is logged in (enables cart sync)
    pub authenticated: bool,
    /// CSRF token for state-changing requests
    pub csrf_token: Option<SecretString>,
    /// Path of the page being driven
    pub page_path: String,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("base_url", &self.base_url.as_str())
            .field("storage_dir", &self.storage_dir)
            .field("authenticated", &self.authenticated)
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "[REDACTED]"))
            .field("page_path", &self.page_path)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = get_or_default(&lookup, "KANTY_BASE_URL", DEFAULT_BASE_URL);
        let base_url = parse_base_url(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("KANTY_BASE_URL".to_string(), e))?;

        let storage_dir = PathBuf::from(get_or_default(
            &lookup,
            "KANTY_STORAGE_DIR",
            DEFAULT_STORAGE_DIR,
        ));

        let authenticated = match lookup("KANTY_AUTHENTICATED") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "KANTY_AUTHENTICATED".to_string(),
                    format!("expected true/false, got '{value}'"),
                )
            })?,
            None => false,
        };

        let csrf_token = lookup("KANTY_CSRF_TOKEN")
            .or_else(|| cookie_value(&lookup("KANTY_COOKIE")?, CSRF_COOKIE))
            .filter(|v| !v.is_empty())
            .map(SecretString::from);

        let page_path = get_or_default(&lookup, "KANTY_PAGE_PATH", "/");

        Ok(Self {
            base_url,
            storage_dir,
            authenticated,
            csrf_token,
            page_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Parse a base URL, forcing a trailing slash so relative joins keep the path.
fn parse_base_url(value: &str) -> Result<Url, String> {
    let mut url = Url::parse(value).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("URL cannot be a base".to_string());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
