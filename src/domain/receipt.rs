//! Receipts returned by successful mutations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Amount, DomainName, Identity};

/// Proof that a registration was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Claimed name.
    pub name: DomainName,
    /// New controller.
    pub controller: Identity,
    /// Exact amount escrowed.
    pub deposit: Amount,
    /// Global mutation sequence.
    pub sequence: u64,
    /// Commit time.
    pub registered_at: DateTime<Utc>,
}

/// Proof that a release was committed and the deposit refunded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// Released name.
    pub name: DomainName,
    /// Former controller, recipient of the refund.
    pub controller: Identity,
    /// Amount transferred back to `controller`.
    pub refund: Amount,
    /// Global mutation sequence.
    pub sequence: u64,
    /// Commit time.
    pub released_at: DateTime<Utc>,
}

/// Aggregate counters describing the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Names currently registered.
    pub registered: usize,
    /// Records ever materialized, registered or not.
    pub known_records: usize,
    /// Total deposits currently held.
    pub escrow: Amount,
    /// Sequence of the most recent mutation (0 if none).
    pub last_sequence: u64,
}
