//! domain-registry server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use domain_registry::api;
use domain_registry::app_state::AppState;
use domain_registry::config::RegistryConfig;
use domain_registry::domain::{DomainStore, EventBus};
use domain_registry::persistence::{PostgresPersistence, writer};
use domain_registry::service::RegistryService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RegistryConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        addr = %config.listen_addr,
        min_deposit = %config.min_deposit,
        persistence = config.persistence_enabled,
        "starting domain-registry"
    );

    // Build domain layer
    let store = Arc::new(DomainStore::new(config.min_deposit));
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Restore durable state before accepting traffic
    let persistence = if config.persistence_enabled {
        let persistence = PostgresPersistence::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        let (records, last_sequence) = persistence.load_state().await?;
        let stats = store.restore(records, last_sequence).await?;
        tracing::info!(
            registered = stats.registered,
            known_records = stats.known_records,
            escrow = %stats.escrow,
            last_sequence = stats.last_sequence,
            "registry state restored"
        );
        Some(persistence)
    } else {
        None
    };

    let retry_interval = Duration::from_secs(config.persistence_retry_secs);
    let writer_handle = persistence
        .clone()
        .map(|p| writer::spawn_writer(p, Arc::clone(&store), &event_bus, retry_interval));

    // Build service layer
    let registry_service = Arc::new(RegistryService::new(Arc::clone(&store), event_bus));

    // Build application state
    let mut app_state = AppState::new(registry_service);
    if let Some(p) = persistence.clone() {
        app_state = app_state.with_persistence(p);
    }

    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Final flush boundary: drain queued events, then snapshot
    if let Some(handle) = writer_handle {
        handle.shutdown().await;
    }
    if let Some(p) = &persistence {
        writer::flush(p, &store).await;
    }

    tracing::info!("domain-registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
