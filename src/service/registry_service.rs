//! Registry service: orchestrates registry operations and emits events.

use std::sync::Arc;

use crate::domain::{
    Amount, DomainInfo, DomainName, DomainStore, EventBus, Identity, Registration, RegistryStats,
    Release,
};
use crate::error::RegistryError;

/// Orchestration layer for all registry operations.
///
/// Owns references to [`DomainStore`] for state and [`EventBus`] for event
/// emission. Mutations publish their event from inside the store's
/// critical section, so subscribers see events in commit order.
#[derive(Debug, Clone)]
pub struct RegistryService {
    store: Arc<DomainStore>,
    event_bus: EventBus,
}

impl RegistryService {
    /// Creates a new `RegistryService`.
    #[must_use]
    pub fn new(store: Arc<DomainStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`DomainStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<DomainStore> {
        &self.store
    }

    /// Returns the minimum deposit a registration must carry.
    #[must_use]
    pub fn min_deposit(&self) -> Amount {
        self.store.min_deposit()
    }

    /// Claims `name` for `caller`, escrowing `payment`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] or
    /// [`RegistryError::InsufficientDeposit`] when the claim is rejected.
    /// No funds are retained on failure.
    pub async fn register(
        &self,
        name: DomainName,
        caller: Identity,
        payment: Amount,
    ) -> Result<Registration, RegistryError> {
        let result = self
            .store
            .register(name.clone(), caller.clone(), payment, |event| {
                self.event_bus.publish(event.clone());
            })
            .await;

        match &result {
            Ok(r) => tracing::info!(
                domain = %r.name,
                controller = %r.controller,
                deposit = %r.deposit,
                sequence = r.sequence,
                "domain registered"
            ),
            Err(e) => tracing::debug!(
                domain = %name,
                caller = %caller,
                payment = %payment,
                error = %e,
                "registration rejected"
            ),
        }
        result
    }

    /// Releases `name` on behalf of `caller` and refunds the deposit.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] or
    /// [`RegistryError::NotController`] when the release is rejected.
    pub async fn release(
        &self,
        name: &DomainName,
        caller: &Identity,
    ) -> Result<Release, RegistryError> {
        let result = self
            .store
            .release(name, caller, |event| {
                self.event_bus.publish(event.clone());
            })
            .await;

        match &result {
            Ok(r) => tracing::info!(
                domain = %r.name,
                controller = %r.controller,
                refund = %r.refund,
                sequence = r.sequence,
                "domain released"
            ),
            Err(e) => tracing::debug!(
                domain = %name,
                caller = %caller,
                error = %e,
                "release rejected"
            ),
        }
        result
    }

    /// Looks up a name; never fails.
    pub async fn domain_info(&self, name: &DomainName) -> DomainInfo {
        self.store.info(name).await
    }

    /// Returns the number of registered names.
    pub async fn registered_count(&self) -> usize {
        self.store.registered_count().await
    }

    /// Returns a snapshot of registered names in insertion order.
    pub async fn registered_domains(&self) -> Vec<DomainName> {
        self.store.registered_names().await
    }

    /// Returns aggregate registry counters.
    pub async fn stats(&self) -> RegistryStats {
        self.store.stats().await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::RegistryEvent;

    fn make_service() -> RegistryService {
        let store = Arc::new(DomainStore::new(Amount::new(100)));
        RegistryService::new(store, EventBus::new(1000))
    }

    fn name(s: &str) -> DomainName {
        let Ok(n) = DomainName::new(s) else {
            panic!("valid name");
        };
        n
    }

    fn id(s: &str) -> Identity {
        let Ok(i) = Identity::new(s) else {
            panic!("valid identity");
        };
        i
    }

    #[tokio::test]
    async fn register_emits_event() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        let result = service
            .register(name("com"), id("0xa"), Amount::new(100))
            .await;
        assert!(result.is_ok());

        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        let RegistryEvent::DomainRegistered {
            name: registered,
            controller,
            deposit,
            sequence,
            ..
        } = event
        else {
            panic!("expected a registration event");
        };
        assert_eq!(registered, name("com"));
        assert_eq!(controller, id("0xa"));
        assert_eq!(deposit, Amount::new(100));
        assert_eq!(sequence, 1);
    }

    #[tokio::test]
    async fn scenario_register_conflict_release_reregister() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        assert!(
            service
                .register(name("com"), id("A"), Amount::new(100))
                .await
                .is_ok()
        );
        let info = service.domain_info(&name("com")).await;
        assert_eq!(info.controller, Some(id("A")));
        assert_eq!(info.deposit, Amount::new(100));
        assert!(info.is_registered);

        let conflict = service
            .register(name("com"), id("B"), Amount::new(100))
            .await;
        assert!(matches!(conflict, Err(RegistryError::AlreadyRegistered(_))));

        let Ok(release) = service.release(&name("com"), &id("A")).await else {
            panic!("release should succeed");
        };
        assert_eq!(release.refund, Amount::new(100));
        assert_eq!(service.domain_info(&name("com")).await, DomainInfo::default());

        assert!(
            service
                .register(name("com"), id("B"), Amount::new(100))
                .await
                .is_ok()
        );

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push((event.event_type_str(), event.controller().to_string()));
        }
        assert_eq!(
            kinds,
            [
                ("domain_registered", "A".to_string()),
                ("domain_released", "A".to_string()),
                ("domain_registered", "B".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn rejected_release_emits_nothing() {
        let service = make_service();
        let _ = service
            .register(name("com"), id("A"), Amount::new(100))
            .await;
        let mut rx = service.event_bus().subscribe();

        let result = service.release(&name("com"), &id("B")).await;
        assert!(matches!(result, Err(RegistryError::NotController(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn count_matches_list() {
        let service = make_service();
        for n in ["a", "b", "c"] {
            let _ = service.register(name(n), id("A"), Amount::new(250)).await;
        }
        let _ = service.release(&name("b"), &id("A")).await;

        let list = service.registered_domains().await;
        assert_eq!(service.registered_count().await, list.len());
        assert_eq!(service.stats().await.escrow, Amount::new(500));
    }
}
