//! Unified error type for callers driving the storefront client.
//!
//! Each module keeps its own error enum; `StorefrontError` wraps them so a
//! front end such as the CLI can use `?` across all of them.

use thiserror::Error;

use crate::config::ConfigError;
use crate::search::SearchError;
use crate::storage::StorageError;
use crate::sync::SyncError;

/// Any failure surfaced by the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart push failed.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Product search failed.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_module_errors() {
        let err: StorefrontError = SyncError::Status(403).into();
        assert_eq!(err.to_string(), "Sync error: sync endpoint returned HTTP 403");

        let err: StorefrontError = ConfigError::InvalidEnvVar(
            "KANTY_AUTHENTICATED".to_string(),
            "expected true/false".to_string(),
        )
        .into();
        assert!(matches!(err, StorefrontError::Config(_)));
    }
}
