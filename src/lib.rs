//! # domain-registry
//!
//! Deposit-backed name reservation registry with REST and WebSocket
//! access.
//!
//! Any caller may claim an unregistered name by escrowing at least the
//! configured minimum deposit, and the controller may later release it to
//! receive the exact deposit back. Every mutation is serialized through a
//! single writer lock and announced as a [`domain::RegistryEvent`].
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── RegistryService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── DomainStore (domain/)
//!     │
//!     └── PostgreSQL Persistence (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
