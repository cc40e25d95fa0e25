//! Registry store with a single global writer lock.
//!
//! [`DomainStore`] keeps every [`DomainRecord`], the insertion-ordered list
//! of registered names, the escrow total, and the mutation sequence behind
//! one [`tokio::sync::RwLock`]. Mutations hold the write lock from
//! validation through commit and event notification, which gives all
//! registrations and releases a single global order. Queries share the
//! read lock and always see a consistent snapshot.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use super::receipt::{Registration, RegistryStats, Release};
use super::{Amount, DomainInfo, DomainName, DomainRecord, Identity, RegistryEvent};
use crate::error::RegistryError;

fn next_sequence(current: u64) -> Result<u64, RegistryError> {
    current
        .checked_add(1)
        .ok_or_else(|| RegistryError::Internal("mutation sequence exhausted".to_string()))
}

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<DomainName, DomainRecord>,
    registered: Vec<DomainName>,
    escrow: Amount,
    sequence: u64,
}

impl StoreState {
    fn is_registered(&self, name: &DomainName) -> bool {
        self.records
            .get(name)
            .is_some_and(DomainRecord::is_registered)
    }
}

/// Central store for all domain reservations.
///
/// # Concurrency
///
/// - Registrations and releases are fully serialized.
/// - Queries may run concurrently with each other.
/// - A failed mutation changes nothing and notifies nobody.
#[derive(Debug)]
pub struct DomainStore {
    state: RwLock<StoreState>,
    min_deposit: Amount,
}

impl DomainStore {
    /// Creates an empty store enforcing `min_deposit`.
    ///
    /// A zero minimum is raised to one so that every registered record
    /// carries a positive deposit.
    #[must_use]
    pub fn new(min_deposit: Amount) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            min_deposit: min_deposit.max(Amount::new(1)),
        }
    }

    /// Returns the minimum deposit accepted by [`Self::register`].
    #[must_use]
    pub const fn min_deposit(&self) -> Amount {
        self.min_deposit
    }

    /// Claims `name` for `caller`, escrowing exactly `payment`.
    ///
    /// `on_commit` runs with the event while the write lock is still held,
    /// so notifications observe the same order as the mutations.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AlreadyRegistered`] if the name has a controller.
    /// - [`RegistryError::InsufficientDeposit`] if `payment` is below the minimum.
    /// - [`RegistryError::Internal`] if the escrow total would overflow.
    pub async fn register<F>(
        &self,
        name: DomainName,
        caller: Identity,
        payment: Amount,
        on_commit: F,
    ) -> Result<Registration, RegistryError>
    where
        F: FnOnce(&RegistryEvent),
    {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if state.is_registered(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        if payment < self.min_deposit {
            return Err(RegistryError::InsufficientDeposit {
                required: self.min_deposit,
                provided: payment,
            });
        }
        let escrow = state
            .escrow
            .checked_add(payment)
            .ok_or_else(|| RegistryError::Internal("escrow total overflow".to_string()))?;
        let sequence = next_sequence(state.sequence)?;
        let now = Utc::now();

        let record = state
            .records
            .entry(name.clone())
            .or_insert_with(|| DomainRecord::vacant(name.clone()));
        record.controller = Some(caller.clone());
        record.deposit = payment;
        record.registered_seq = sequence;
        record.registered_at = Some(now);

        state.registered.push(name.clone());
        state.escrow = escrow;
        state.sequence = sequence;

        on_commit(&RegistryEvent::DomainRegistered {
            name: name.clone(),
            controller: caller.clone(),
            deposit: payment,
            sequence,
            timestamp: now,
        });

        Ok(Registration {
            name,
            controller: caller,
            deposit: payment,
            sequence,
            registered_at: now,
        })
    }

    /// Releases `name` on behalf of `caller`, refunding the full deposit.
    ///
    /// The record is zeroed and the name leaves the registered list in the
    /// same critical section that computes the refund.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the name has no controller.
    /// - [`RegistryError::NotController`] if `caller` is not the controller.
    pub async fn release<F>(
        &self,
        name: &DomainName,
        caller: &Identity,
        on_commit: F,
    ) -> Result<Release, RegistryError>
    where
        F: FnOnce(&RegistryEvent),
    {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let record = state
            .records
            .get_mut(name)
            .filter(|r| r.is_registered())
            .ok_or_else(|| RegistryError::NotRegistered(name.clone()))?;
        if record.controller.as_ref() != Some(caller) {
            return Err(RegistryError::NotController(name.clone()));
        }
        let escrow = state
            .escrow
            .checked_sub(record.deposit)
            .ok_or_else(|| RegistryError::Internal("escrow total underflow".to_string()))?;
        let sequence = next_sequence(state.sequence)?;

        let (_, refund) = record.clear();
        state.registered.retain(|n| n != name);
        state.escrow = escrow;
        state.sequence = sequence;
        let now = Utc::now();

        on_commit(&RegistryEvent::DomainReleased {
            name: name.clone(),
            controller: caller.clone(),
            refund,
            sequence,
            timestamp: now,
        });

        Ok(Release {
            name: name.clone(),
            controller: caller.clone(),
            refund,
            sequence,
            released_at: now,
        })
    }

    /// Looks up a name. Unknown and released names yield zeroed info.
    pub async fn info(&self, name: &DomainName) -> DomainInfo {
        self.state
            .read()
            .await
            .records
            .get(name)
            .map(DomainRecord::info)
            .unwrap_or_default()
    }

    /// Returns the number of registered names.
    pub async fn registered_count(&self) -> usize {
        self.state.read().await.registered.len()
    }

    /// Returns a snapshot of registered names in insertion order.
    pub async fn registered_names(&self) -> Vec<DomainName> {
        self.state.read().await.registered.clone()
    }

    /// Returns the total amount currently held in escrow.
    pub async fn escrow_balance(&self) -> Amount {
        self.state.read().await.escrow
    }

    /// Returns aggregate counters from one consistent snapshot.
    pub async fn stats(&self) -> RegistryStats {
        let state = self.state.read().await;
        RegistryStats {
            registered: state.registered.len(),
            known_records: state.records.len(),
            escrow: state.escrow,
            last_sequence: state.sequence,
        }
    }

    /// Returns every materialized record and the current sequence, taken
    /// under one read lock. Used to flush the full state to durable storage.
    pub async fn snapshot(&self) -> (Vec<DomainRecord>, u64) {
        let state = self.state.read().await;
        (state.records.values().cloned().collect(), state.sequence)
    }

    /// Replaces the store contents with previously persisted records.
    ///
    /// Registered records are re-listed in ascending `registered_seq`
    /// order. The sequence counter resumes from the larger of
    /// `last_sequence` and the highest restored `registered_seq`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Internal`] if a record violates the
    /// controller/deposit invariant, appears twice, or the escrow total
    /// overflows. The store is left untouched in that case.
    pub async fn restore(
        &self,
        records: Vec<DomainRecord>,
        last_sequence: u64,
    ) -> Result<RegistryStats, RegistryError> {
        let mut next = StoreState {
            sequence: last_sequence,
            ..StoreState::default()
        };
        let mut live: Vec<(u64, DomainName)> = Vec::new();

        for record in records {
            if record.is_registered() == record.deposit.is_zero() {
                return Err(RegistryError::Internal(format!(
                    "inconsistent persisted record for {}",
                    record.name
                )));
            }
            if record.is_registered() {
                next.escrow = next.escrow.checked_add(record.deposit).ok_or_else(|| {
                    RegistryError::Internal("escrow total overflow".to_string())
                })?;
                next.sequence = next.sequence.max(record.registered_seq);
                live.push((record.registered_seq, record.name.clone()));
            }
            let name = record.name.clone();
            if next.records.insert(name.clone(), record).is_some() {
                return Err(RegistryError::Internal(format!(
                    "duplicate persisted record for {name}"
                )));
            }
        }

        live.sort_by_key(|(seq, _)| *seq);
        next.registered = live.into_iter().map(|(_, name)| name).collect();

        let stats = RegistryStats {
            registered: next.registered.len(),
            known_records: next.records.len(),
            escrow: next.escrow,
            last_sequence: next.sequence,
        };
        *self.state.write().await = next;
        Ok(stats)
    }
}

impl Default for DomainStore {
    fn default() -> Self {
        Self::new(Amount::new(1))
    }
}
