//! Per-connection subscription manager.
//!
//! Tracks which domain names a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::DomainName;

/// Manages the set of name subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed names. Ignored while `subscribe_all` is set.
    names: HashSet<DomainName>,
    /// Whether the client subscribes to every name (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds names to the subscription set; `wildcard` enables all names.
    pub fn subscribe(&mut self, names: &[DomainName], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.names.extend(names.iter().cloned());
    }

    /// Removes names from the subscription set; `wildcard` clears the
    /// all-names flag.
    pub fn unsubscribe(&mut self, names: &[DomainName], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for name in names {
            self.names.remove(name);
        }
    }

    /// Returns `true` if events for `name` should be forwarded.
    #[must_use]
    pub fn matches(&self, name: &DomainName) -> bool {
        self.subscribe_all || self.names.contains(name)
    }

    /// Returns the number of explicitly subscribed names.
    #[must_use]
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
