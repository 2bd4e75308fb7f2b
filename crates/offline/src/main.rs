//! My Kanty offline proxy.
//!
//! Runs the offline cache controller in front of the marketplace on port
//! 3001. The worker is installed and activated at startup; a failed install
//! aborts startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use kanty_offline::{CacheStorage, HttpNetwork, OfflineWorker, ProxyConfig, TracingHost, proxy};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env before reading the log settings
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Offline proxy failed");
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`, as JSON when `KANTY_LOG_FORMAT=json`.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kanty_offline=info,tower_http=debug".into());
    let json = std::env::var("KANTY_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ProxyConfig::from_env()?;
    let network = HttpNetwork::new(config.timeout)?;

    let worker = OfflineWorker::new(
        config.worker.clone(),
        CacheStorage::new(),
        Arc::new(network),
        Arc::new(TracingHost),
    );
    worker.install().await?;
    worker.activate().await?;

    let app = proxy::router(worker);

    let addr = config.socket_addr();
    tracing::info!(upstream = %config.worker.origin, "offline proxy listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
