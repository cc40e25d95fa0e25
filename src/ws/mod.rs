//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams registry events to subscribed
//! clients and answers read-only lookups.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
