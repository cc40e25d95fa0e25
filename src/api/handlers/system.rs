//! System endpoints: health check and registry parameters.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Registry parameters and live counters.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistryConfigResponse {
    /// Minimum deposit accepted by registrations (string-encoded).
    min_deposit: String,
    /// Names currently registered.
    registered: usize,
    /// Records ever materialized.
    known_records: usize,
    /// Total deposits held in escrow (string-encoded).
    escrow: String,
    /// Sequence of the most recent mutation.
    last_sequence: u64,
}

/// `GET /config/registry` — Registry parameters.
#[utoipa::path(
    get,
    path = "/config/registry",
    tag = "System",
    summary = "Registry parameters",
    description = "Returns the minimum deposit and a consistent snapshot of registry counters, including the escrow total.",
    responses(
        (status = 200, description = "Registry parameters", body = RegistryConfigResponse),
    )
)]
pub async fn registry_config_handler(State(state): State<AppState>) -> impl IntoResponse {
    let service = &state.registry_service;
    let stats = service.stats().await;
    Json(RegistryConfigResponse {
        min_deposit: service.min_deposit().to_string(),
        registered: stats.registered,
        known_records: stats.known_records,
        escrow: stats.escrow.to_string(),
        last_sequence: stats.last_sequence,
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/registry", get(registry_config_handler))
}
