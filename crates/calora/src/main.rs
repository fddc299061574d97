//! calora -- REST gateway over the myVAILLANT heating cloud.
//!
//! Startup: tracing, environment config, facade construction, axum
//! serve. Shutdown: SIGINT/SIGTERM stops the listener, then the vendor
//! session is closed before the process exits. In-flight vendor calls
//! are not awaited.

mod routes;

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use calora_core::{HeatingService, ServiceConfig};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "fatal");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; `LOG_LEVEL` covers deployments that predate it.
fn init_tracing() {
    let fallback = std::env::var("LOG_LEVEL")
        .map(|level| level.to_lowercase())
        .unwrap_or_else(|_| "info".into());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = calora_config::load_config()?;
    let addr = config.server.bind_addr()?;

    let service = Arc::new(HeatingService::new(ServiceConfig::new(config.credentials))?);

    let app = routes::router(Arc::clone(&service)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The vendor connection must be released before exit.
    info!("closing vendor session");
    service.shutdown().await;
    info!("shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
