//! The environment a worker runs in: its clients and registration.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::push::NotificationRequest;

/// Identifies a shown notification.
pub type NotificationId = Uuid;

/// Client and registration operations available to the worker.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Take control of every open page.
    async fn claim_clients(&self);

    /// Display a notification.
    async fn show_notification(&self, request: &NotificationRequest) -> NotificationId;

    /// Remove a notification.
    async fn close_notification(&self, id: NotificationId);

    /// Focus or open a window on `url`.
    async fn open_window(&self, url: &str);
}

/// Host that only logs. Used by the proxy, which has no pages to control.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHost;

#[async_trait]
impl WorkerHost for TracingHost {
    async fn claim_clients(&self) {
        info!("Worker now controls open clients");
    }

    async fn show_notification(&self, request: &NotificationRequest) -> NotificationId {
        let id = Uuid::new_v4();
        info!(%id, title = %request.title, body = %request.body, "Notification shown");
        id
    }

    async fn close_notification(&self, id: NotificationId) {
        info!(%id, "Notification closed");
    }

    async fn open_window(&self, url: &str) {
        info!(url, "Opening window");
    }
}

/// A call made on a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    ClaimClients,
    ShowNotification(NotificationId, Box<NotificationRequest>),
    CloseNotification(NotificationId),
    OpenWindow(String),
}

/// Host that records every call, for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: HostCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl WorkerHost for RecordingHost {
    async fn claim_clients(&self) {
        self.record(HostCall::ClaimClients);
    }

    async fn show_notification(&self, request: &NotificationRequest) -> NotificationId {
        let id = Uuid::new_v4();
        self.record(HostCall::ShowNotification(id, Box::new(request.clone())));
        id
    }

    async fn close_notification(&self, id: NotificationId) {
        self.record(HostCall::CloseNotification(id));
    }

    async fn open_window(&self, url: &str) {
        self.record(HostCall::OpenWindow(url.to_string()));
    }
}
