//! Publisher web server.
//!
//! Exposes the SQS/SNS publish operations over HTTP: clients POST messages
//! and the server forwards them to the configured backends. The SDK clients
//! are created once at startup and shared across all requests.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use publisher::web::{router, AppState};
use publisher::{Config, Publisher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("publisher_web_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        sqs_region = %config.sqs.region,
        sns_region = %config.sns.region,
        sqs_endpoint = ?config.sqs.endpoint,
        sns_endpoint = ?config.sns.endpoint,
        "config_loaded"
    );

    // Create the shared SQS/SNS clients
    let publisher = Publisher::new(&config).await;

    // Create application state and router
    let port = config.port;
    let state = AppState::new(config, publisher.clone());
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "publisher_web_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Release the shared clients
    publisher.close();

    info!("publisher_web_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("publisher_web_shutting_down");
}
