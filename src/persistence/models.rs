//! Database models for events and domain records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, DomainName, DomainRecord, Identity};
use crate::error::RegistryError;

/// A stored event row from the `registry_events` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Global mutation sequence.
    pub sequence: i64,
    /// Domain the event concerns.
    pub domain: String,
    /// Event type discriminator (e.g. `"domain_registered"`).
    pub event_type: String,
    /// JSONB payload with the full serialized event.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A row from the `domain_records` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredDomainRecord {
    /// Domain name (primary key).
    pub name: String,
    /// Current controller, `NULL` when released.
    pub controller: Option<String>,
    /// Escrowed deposit as decimal text.
    pub deposit: String,
    /// Sequence of the registration behind the current claim.
    pub registered_seq: i64,
    /// Time of the current claim.
    pub registered_at: Option<DateTime<Utc>>,
    /// Sequence of the last event that touched this row.
    pub last_sequence: i64,
}

impl TryFrom<StoredDomainRecord> for DomainRecord {
    type Error = RegistryError;

    fn try_from(row: StoredDomainRecord) -> Result<Self, Self::Error> {
        let corrupt =
            |what: &str| RegistryError::PersistenceError(format!("corrupt row {}: {what}", row.name));

        let name = DomainName::new(row.name.as_str()).map_err(|_| corrupt("empty name"))?;
        let controller = row
            .controller
            .as_deref()
            .map(Identity::new)
            .transpose()
            .map_err(|_| corrupt("blank controller"))?;
        let deposit = Amount::parse(&row.deposit).map_err(|_| corrupt("deposit"))?;
        let registered_seq =
            u64::try_from(row.registered_seq).map_err(|_| corrupt("negative sequence"))?;

        Ok(Self {
            name,
            controller,
            deposit,
            registered_seq,
            registered_at: row.registered_at,
        })
    }
}
