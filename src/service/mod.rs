//! Service layer: business logic orchestration.
//!
//! [`RegistryService`] coordinates registry operations against the
//! [`super::domain::DomainStore`] and emits events through the
//! [`super::domain::EventBus`].

pub mod registry_service;

pub use registry_service::RegistryService;
