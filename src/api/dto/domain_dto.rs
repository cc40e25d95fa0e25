//! Domain registration, release, and lookup DTOs.
//!
//! Amounts travel as decimal strings; names and identities as plain
//! strings validated by the handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{Amount, DomainInfo, DomainName, Identity, Registration, Release};
use crate::persistence::models::StoredEvent;

/// Request body for `POST /domains`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterDomainRequest {
    /// Name to claim (case-sensitive, non-empty).
    pub name: DomainName,
    /// Identity of the claimant.
    pub caller: Identity,
    /// Deposit attached to the claim: a decimal string, or a JSON integer
    /// up to `u64::MAX`.
    #[schema(value_type = String, example = "100")]
    pub payment: Amount,
}

/// Response body for `POST /domains` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterDomainResponse {
    /// Claimed name.
    pub name: String,
    /// New controller.
    pub controller: String,
    /// Escrowed deposit (string-encoded).
    pub deposit: String,
    /// Global mutation sequence.
    pub sequence: u64,
    /// Commit timestamp.
    pub registered_at: DateTime<Utc>,
}

impl From<Registration> for RegisterDomainResponse {
    fn from(r: Registration) -> Self {
        Self {
            name: r.name.into_inner(),
            controller: r.controller.to_string(),
            deposit: r.deposit.to_string(),
            sequence: r.sequence,
            registered_at: r.registered_at,
        }
    }
}

/// Request body for `POST /domains/{name}/release`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReleaseDomainRequest {
    /// Identity requesting the release; must be the controller.
    pub caller: Identity,
}

/// Response body for `POST /domains/{name}/release`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReleaseDomainResponse {
    /// Released name.
    pub name: String,
    /// Refund recipient.
    pub controller: String,
    /// Refunded amount (string-encoded), equal to the original deposit.
    pub refund: String,
    /// Global mutation sequence.
    pub sequence: u64,
    /// Commit timestamp.
    pub released_at: DateTime<Utc>,
}

impl From<Release> for ReleaseDomainResponse {
    fn from(r: Release) -> Self {
        Self {
            name: r.name.into_inner(),
            controller: r.controller.to_string(),
            refund: r.refund.to_string(),
            sequence: r.sequence,
            released_at: r.released_at,
        }
    }
}

/// Response body for `GET /domains/{name}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DomainInfoResponse {
    /// Queried name.
    pub name: String,
    /// Current controller, `null` when unregistered.
    pub controller: Option<String>,
    /// Escrowed deposit (string-encoded), `"0"` when unregistered.
    pub deposit: String,
    /// Whether the name is currently claimed.
    pub is_registered: bool,
}

impl DomainInfoResponse {
    /// Builds the response for `name` from a lookup result.
    #[must_use]
    pub fn new(name: &DomainName, info: DomainInfo) -> Self {
        Self {
            name: name.to_string(),
            controller: info.controller.map(|c| c.to_string()),
            deposit: info.deposit.to_string(),
            is_registered: info.is_registered,
        }
    }
}

/// Paginated list response for `GET /domains`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DomainListResponse {
    /// Registered names in insertion order.
    pub data: Vec<String>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for `GET /registry/count`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DomainCountResponse {
    /// Number of registered names.
    pub count: usize,
}

/// Query parameters for `GET /domains/{name}/events`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventHistoryParams {
    /// Only return events with a sequence above this value. Defaults to 0.
    #[serde(default)]
    pub after: u64,
    /// Maximum number of events (1..=500). Defaults to 100.
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    100
}

/// One logged event in a history response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DomainEventDto {
    /// Global mutation sequence.
    pub sequence: i64,
    /// Event type discriminator.
    pub event_type: String,
    /// Full serialized event.
    pub payload: serde_json::Value,
    /// Time the event was persisted.
    pub created_at: DateTime<Utc>,
}

impl From<StoredEvent> for DomainEventDto {
    fn from(e: StoredEvent) -> Self {
        Self {
            sequence: e.sequence,
            event_type: e.event_type,
            payload: e.payload,
            created_at: e.created_at,
        }
    }
}

/// Response body for `GET /domains/{name}/events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DomainHistoryResponse {
    /// Queried name.
    pub name: String,
    /// Events in ascending sequence order.
    pub events: Vec<DomainEventDto>,
}
