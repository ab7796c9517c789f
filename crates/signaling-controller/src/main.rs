//! Signaling controller.
//!
//! Stateless-media signaling server for peer-to-peer video conferencing.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Initialize Prometheus metrics recorder
//! 3. Spawn the relay actor
//! 4. Bind the HTTP/WebSocket listener (fail fast on bind errors)
//! 5. Mark ready and serve until a shutdown signal arrives

#![warn(clippy::pedantic)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use signaling_controller::config::Config;
use signaling_controller::ice;
use signaling_controller::metrics::init_metrics_recorder;
use signaling_controller::relay::RelayHandle;
use signaling_controller::server::{app, AppState, HealthState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signaling_controller=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting signaling controller");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        turn_enabled = config.turn_enabled,
        "Configuration loaded successfully"
    );

    // Metrics recorder must be installed before anything records
    let prometheus_handle = init_metrics_recorder().map_err(|e| {
        error!(error = %e, "Failed to install Prometheus metrics recorder");
        e
    })?;

    let health_state = Arc::new(HealthState::new());

    let ice_servers = ice::ice_servers(&config);
    let relay = RelayHandle::new(ice_servers.clone());
    info!("Relay actor started");

    let metrics_router = Router::new().route(
        "/metrics",
        axum::routing::get(move || {
            let handle = prometheus_handle.clone();
            async move { handle.render() }
        }),
    );

    let state = AppState::new(relay.clone(), ice_servers, Arc::clone(&health_state));
    let router = app(state).merge(metrics_router);

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!(error = %e, addr = %config.bind_address, "Invalid bind address");
        format!("Invalid bind address {}: {e}", config.bind_address)
    })?;

    // Bind before serving to fail fast on bind errors
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "Failed to bind listener");
        format!("Failed to bind to {addr}: {e}")
    })?;
    info!(addr = %addr, "Listener bound successfully");

    health_state.set_ready();

    let server = axum::serve(listener, router).with_graceful_shutdown(shutdown_signal());
    info!(addr = %addr, "Signaling controller running - press Ctrl+C to shutdown");
    server.await.map_err(|e| {
        error!(error = %e, "Server failed");
        e
    })?;

    // Mark not ready so load balancers drain, then stop the relay
    info!("Shutdown signal received, initiating graceful shutdown...");
    health_state.set_not_ready();
    relay.cancel();

    info!("Signaling controller shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed. This is acceptable because
/// without signal handlers, we cannot gracefully shut down the service.
async fn shutdown_signal() {
    let ctrl_c = async {
        #[expect(
            clippy::expect_used,
            reason = "Signal handler installation is critical - panic is appropriate if it fails"
        )]
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        #[expect(
            clippy::expect_used,
            reason = "Signal handler installation is critical - panic is appropriate if it fails"
        )]
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
