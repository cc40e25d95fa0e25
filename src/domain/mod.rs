//! Domain layer: core types, the registry store, and the event system.
//!
//! This module contains the registry's domain model: validated names,
//! caller identities, escrow amounts, per-name records, the event bus for
//! broadcasting state changes, and the [`DomainStore`] that serializes
//! every mutation.

pub mod amount;
pub mod domain_name;
pub mod domain_record;
pub mod domain_store;
pub mod event_bus;
pub mod identity;
pub mod receipt;
pub mod registry_event;

pub use amount::Amount;
pub use domain_name::DomainName;
pub use domain_record::{DomainInfo, DomainRecord};
pub use domain_store::DomainStore;
pub use event_bus::EventBus;
pub use identity::Identity;
pub use receipt::{Registration, RegistryStats, Release};
pub use registry_event::RegistryEvent;
