//! Per-name registry record and its read-only projection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Amount, DomainName, Identity};

/// Stored state for a single domain name.
///
/// Records are created lazily on first registration and never removed;
/// a release zeroes the record in place. While registered, `controller`
/// is `Some` and `deposit` is the exact amount paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// Name this record belongs to (immutable).
    pub name: DomainName,

    /// Current claimant, `None` when unregistered.
    pub controller: Option<Identity>,

    /// Amount held in escrow for this name.
    pub deposit: Amount,

    /// Global sequence of the registration that produced the current claim.
    /// Zero when unregistered.
    pub registered_seq: u64,

    /// Time of the current claim, `None` when unregistered.
    pub registered_at: Option<DateTime<Utc>>,
}

impl DomainRecord {
    /// Creates an unregistered (zeroed) record for `name`.
    #[must_use]
    pub fn vacant(name: DomainName) -> Self {
        Self {
            name,
            controller: None,
            deposit: Amount::ZERO,
            registered_seq: 0,
            registered_at: None,
        }
    }

    /// Returns `true` while the name has a controller.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.controller.is_some()
    }

    /// Zeroes the record, returning the previous controller and deposit.
    pub fn clear(&mut self) -> (Option<Identity>, Amount) {
        let controller = self.controller.take();
        let deposit = std::mem::take(&mut self.deposit);
        self.registered_seq = 0;
        self.registered_at = None;
        (controller, deposit)
    }

    /// Read-only projection used by queries.
    #[must_use]
    pub fn info(&self) -> DomainInfo {
        DomainInfo {
            controller: self.controller.clone(),
            deposit: self.deposit,
            is_registered: self.is_registered(),
        }
    }
}

/// Answer to a domain lookup.
///
/// Unknown and released names both yield [`DomainInfo::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainInfo {
    /// Current controller, or `None`.
    pub controller: Option<Identity>,
    /// Escrowed deposit, zero when unregistered.
    pub deposit: Amount,
    /// Whether the name is currently claimed.
    pub is_registered: bool,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn vacant_record_reports_default_info() {
        let Ok(name) = DomainName::new("com") else {
            panic!("valid name");
        };
        let record = DomainRecord::vacant(name);
        assert!(!record.is_registered());
        assert_eq!(record.info(), DomainInfo::default());
    }

    #[test]
    fn clear_returns_previous_claim() {
        let (Ok(name), Ok(owner)) = (DomainName::new("com"), Identity::new("0xa")) else {
            panic!("valid inputs");
        };
        let mut record = DomainRecord {
            name,
            controller: Some(owner.clone()),
            deposit: Amount::new(100),
            registered_seq: 7,
            registered_at: Some(Utc::now()),
        };

        let (controller, deposit) = record.clear();
        assert_eq!(controller, Some(owner));
        assert_eq!(deposit, Amount::new(100));
        assert_eq!(record.info(), DomainInfo::default());
        assert_eq!(record.registered_seq, 0);
    }
}
