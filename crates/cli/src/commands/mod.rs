//! Command implementations.

pub mod cart;
pub mod price;
pub mod search;
pub mod wishlist;

use std::sync::Arc;

use kanty_core::PriceParseError;
use kanty_storefront::search::SearchError;
use kanty_storefront::{
    FileStore, HeadlessPage, HttpCartSync, Mutation, StorageError, Storefront, StorefrontConfig,
    StorefrontError, SyncError,
};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Price argument could not be parsed.
    #[error("Invalid price: {0}")]
    Price(#[from] PriceParseError),
}

impl From<StorageError> for CommandError {
    fn from(e: StorageError) -> Self {
        Self::Storefront(e.into())
    }
}

impl From<SyncError> for CommandError {
    fn from(e: SyncError) -> Self {
        Self::Storefront(e.into())
    }
}

impl From<SearchError> for CommandError {
    fn from(e: SearchError) -> Self {
        Self::Storefront(e.into())
    }
}

/// The storefront as a command sees it: file-backed, on a headless page.
pub type CliStorefront = Storefront<FileStore, HeadlessPage>;

/// Open the persisted storefront described by `config`.
///
/// # Errors
///
/// Returns `CommandError` if the storage directory or sync endpoint is unusable.
pub fn open_storefront(config: &StorefrontConfig) -> Result<CliStorefront, CommandError> {
    let store = FileStore::open(config.storage_dir.clone())?;
    let page = HeadlessPage::new(config.page_path.clone()).authenticated(config.authenticated);
    let syncer = HttpCartSync::new(&config.base_url, config.csrf_token.clone())?;

    let mut storefront = Storefront::new(store, page).with_syncer(Arc::new(syncer));
    storefront.init();
    Ok(storefront)
}

/// Wait for the server push started by `mutation`, if any, and log the result.
///
/// A failed push leaves the local cart as it is.
pub async fn report_sync(mutation: Mutation) {
    let Some(handle) = mutation.sync else {
        tracing::debug!("No cart sync for this change");
        return;
    };
    match handle.outcome().await {
        Ok(_) => tracing::info!("Cart synchronized with server"),
        Err(e) => tracing::warn!(error = %e, "Cart sync failed, local cart kept"),
    }
}

/// Print every notification the storefront is showing.
#[allow(clippy::print_stdout)]
pub fn print_notifications(storefront: &CliStorefront) {
    for notification in storefront.notifications().visible() {
        println!("[{}] {}", notification.kind.css_class(), notification.message);
    }
}
