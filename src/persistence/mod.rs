//! Persistence layer: PostgreSQL event log and durable domain records.
//!
//! State is loaded into the [`crate::domain::DomainStore`] once at startup
//! ([`PostgresPersistence::load_state`]) and flushed after every committed
//! mutation by the background [`writer`], which retries failed writes and
//! drains its queue on shutdown.

pub mod models;
pub mod postgres;
pub mod writer;

pub use postgres::PostgresPersistence;
pub use writer::{EventSink, WriterHandle};
