//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use domain_registry::api;
use domain_registry::app_state::AppState;
use domain_registry::domain::{Amount, DomainStore, EventBus};
use domain_registry::service::RegistryService;

/// Minimum deposit used by every test server.
pub const MIN_DEPOSIT: u128 = 100;

/// Starts a server on an ephemeral port and returns its address.
#[allow(clippy::panic)]
pub async fn spawn_app() -> SocketAddr {
    let store = Arc::new(DomainStore::new(Amount::new(MIN_DEPOSIT)));
    let service = Arc::new(RegistryService::new(store, EventBus::new(256)));
    let app = api::build_app(AppState::new(service), Duration::from_secs(5));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
