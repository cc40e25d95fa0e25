//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    DomainCountResponse, DomainEventDto, DomainHistoryResponse, DomainInfoResponse,
    DomainListResponse, PaginationMeta, RegisterDomainRequest, RegisterDomainResponse,
    ReleaseDomainRequest, ReleaseDomainResponse,
};
use super::handlers::{domain, system};
use crate::domain::{DomainName, Identity};
use crate::error::{ErrorBody, ErrorResponse};

/// Aggregated OpenAPI document, served by Swagger UI when the
/// `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "domain-registry",
        description = "Deposit-backed name reservation registry"
    ),
    paths(
        domain::register_domain,
        domain::release_domain,
        domain::get_domain,
        domain::list_domains,
        domain::count_domains,
        domain::domain_history,
        system::health_handler,
        system::registry_config_handler,
    ),
    components(schemas(
        DomainName,
        Identity,
        RegisterDomainRequest,
        RegisterDomainResponse,
        ReleaseDomainRequest,
        ReleaseDomainResponse,
        DomainInfoResponse,
        DomainListResponse,
        DomainCountResponse,
        DomainEventDto,
        DomainHistoryResponse,
        PaginationMeta,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
        system::RegistryConfigResponse,
    )),
    tags(
        (name = "Domains", description = "Registration, release, and lookup"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;
