//! My Kanty storefront client.
//!
//! Browser-side state for the marketplace: cart and wishlist persisted in
//! local storage, best-effort cart sync to the server, toast notifications,
//! instant product search and delete confirmation. The page itself is
//! abstracted behind [`page::Page`] so the same logic drives a real DOM
//! binding, the CLI and tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod confirm;
pub mod csrf;
pub mod error;
pub mod events;
pub mod manager;
pub mod notifications;
pub mod page;
pub mod search;
pub mod state;
pub mod storage;
pub mod sync;

pub use config::StorefrontConfig;
pub use error::StorefrontError;
pub use events::{EventOutcome, PageEvent};
pub use manager::{Mutation, Storefront};
pub use page::{HeadlessPage, Page};
pub use state::ClientState;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use sync::{CartSyncer, HttpCartSync, SyncAck, SyncError, SyncHandle};
