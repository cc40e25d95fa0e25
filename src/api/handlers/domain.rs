//! Domain handlers: register, release, lookup, list, count, history.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    DomainCountResponse, DomainEventDto, DomainHistoryResponse, DomainInfoResponse,
    DomainListResponse, EventHistoryParams, PaginationParams, RegisterDomainRequest,
    RegisterDomainResponse, ReleaseDomainRequest, ReleaseDomainResponse,
};
use crate::app_state::AppState;
use crate::domain::DomainName;
use crate::error::{ErrorResponse, RegistryError};

/// `POST /domains` — Register a domain.
///
/// # Errors
///
/// Returns [`RegistryError`] on a malformed body, an existing claim, or a
/// deposit below the minimum. Body errors surface as
/// [`RegistryError::InvalidRequest`].
#[utoipa::path(
    post,
    path = "/api/v1/domains",
    tag = "Domains",
    summary = "Register a domain",
    description = "Claims an unregistered name for the caller, escrowing the exact payment. The payment must be at least the configured minimum deposit.",
    request_body = RegisterDomainRequest,
    responses(
        (status = 201, description = "Domain registered", body = RegisterDomainResponse),
        (status = 400, description = "Invalid request or insufficient deposit", body = ErrorResponse),
        (status = 409, description = "Domain already registered", body = ErrorResponse),
    )
)]
pub async fn register_domain(
    State(state): State<AppState>,
    body: Result<Json<RegisterDomainRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let Json(req) = body?;

    let registration = state
        .registry_service
        .register(req.name, req.caller, req.payment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterDomainResponse::from(registration)),
    ))
}

/// `POST /domains/{name}/release` — Release a domain and refund its deposit.
///
/// # Errors
///
/// Returns [`RegistryError`] if the name is not registered or the caller
/// is not its controller.
#[utoipa::path(
    post,
    path = "/api/v1/domains/{name}/release",
    tag = "Domains",
    summary = "Release a domain",
    description = "Releases a name held by the caller and refunds the full deposit.",
    params(
        ("name" = String, Path, description = "Domain name"),
    ),
    request_body = ReleaseDomainRequest,
    responses(
        (status = 200, description = "Domain released", body = ReleaseDomainResponse),
        (status = 403, description = "Caller is not the controller", body = ErrorResponse),
        (status = 404, description = "Domain not registered", body = ErrorResponse),
    )
)]
pub async fn release_domain(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<ReleaseDomainRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RegistryError> {
    let name = DomainName::new(name)?;
    let Json(req) = body?;

    let release = state.registry_service.release(&name, &req.caller).await?;
    Ok(Json(ReleaseDomainResponse::from(release)))
}

/// `GET /domains/{name}` — Look up a domain.
///
/// Unknown and released names both return a zeroed record with `200`.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidRequest`] for an empty name.
#[utoipa::path(
    get,
    path = "/api/v1/domains/{name}",
    tag = "Domains",
    summary = "Get domain info",
    description = "Returns the controller, deposit, and registration flag for a name. Never-seen and released names report a null controller and zero deposit.",
    params(
        ("name" = String, Path, description = "Domain name"),
    ),
    responses(
        (status = 200, description = "Domain info", body = DomainInfoResponse),
    )
)]
pub async fn get_domain(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, RegistryError> {
    let name = DomainName::new(name)?;
    let info = state.registry_service.domain_info(&name).await;
    Ok(Json(DomainInfoResponse::new(&name, info)))
}

/// `GET /domains` — List registered domains in insertion order.
#[utoipa::path(
    get,
    path = "/api/v1/domains",
    tag = "Domains",
    summary = "List registered domains",
    description = "Returns a paginated snapshot of currently registered names in registration order.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated domain list", body = DomainListResponse),
    )
)]
pub async fn list_domains(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let names = state.registry_service.registered_domains().await;
    let (data, pagination) = params.paginate(names);

    Json(DomainListResponse {
        data: data.into_iter().map(DomainName::into_inner).collect(),
        pagination,
    })
}

/// `GET /registry/count` — Number of registered domains.
#[utoipa::path(
    get,
    path = "/api/v1/registry/count",
    tag = "Domains",
    summary = "Count registered domains",
    responses(
        (status = 200, description = "Registered domain count", body = DomainCountResponse),
    )
)]
pub async fn count_domains(State(state): State<AppState>) -> impl IntoResponse {
    Json(DomainCountResponse {
        count: state.registry_service.registered_count().await,
    })
}

/// `GET /domains/{name}/events` — Logged events for a domain.
///
/// # Errors
///
/// Returns [`RegistryError::Unavailable`] when persistence is disabled and
/// [`RegistryError::PersistenceError`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/domains/{name}/events",
    tag = "Domains",
    summary = "Domain event history",
    description = "Returns persisted registration and release events for a name in sequence order. Requires the PostgreSQL event log.",
    params(
        ("name" = String, Path, description = "Domain name"),
        EventHistoryParams,
    ),
    responses(
        (status = 200, description = "Event history", body = DomainHistoryResponse),
        (status = 503, description = "Event log not configured", body = ErrorResponse),
    )
)]
pub async fn domain_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<EventHistoryParams>,
) -> Result<impl IntoResponse, RegistryError> {
    let name = DomainName::new(name)?;
    let persistence = state
        .persistence
        .as_ref()
        .filter(|p| p.event_log_enabled())
        .ok_or_else(|| RegistryError::Unavailable("event log is disabled".to_string()))?;

    let events = persistence
        .load_events_after(&name, params.after, params.limit.clamp(1, 500))
        .await?;

    Ok(Json(DomainHistoryResponse {
        name: name.into_inner(),
        events: events.into_iter().map(DomainEventDto::from).collect(),
    }))
}

/// Domain routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/domains", post(register_domain).get(list_domains))
        .route("/registry/count", get(count_domains))
        .route("/domains/{name}", get(get_domain))
        .route("/domains/{name}/release", post(release_domain))
        .route("/domains/{name}/events", get(domain_history))
}
