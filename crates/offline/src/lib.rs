//! My Kanty offline cache controller.
//!
//! A service worker for the marketplace PWA expressed as a library:
//! lifecycle handling (install, activate), a network-first fetch policy with
//! cache and offline-page fallback, and push notification handling. The
//! [`proxy`] module hosts the worker in front of an upstream site so the
//! same policy can run as an HTTP server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod host;
pub mod lifecycle;
pub mod network;
pub mod proxy;
pub mod push;
pub mod request;
pub mod response;
pub mod worker;

pub use cache::{CacheError, CacheStorage, NamedCache};
pub use config::{ProxyConfig, WorkerConfig};
pub use host::{HostCall, RecordingHost, TracingHost, WorkerHost};
pub use lifecycle::WorkerState;
pub use network::{HttpNetwork, Network, NetworkError};
pub use push::{NotificationRequest, PushMessage};
pub use request::{FetchRequest, RequestMode};
pub use response::WorkerResponse;
pub use worker::{EventResult, FetchOutcome, NotificationClick, OfflineWorker, WorkerError, WorkerEvent};
