//! Domain events reflecting registry state mutations.
//!
//! Every successful registration or release emits a [`RegistryEvent`]
//! through the [`super::EventBus`]. Events are broadcast to WebSocket
//! subscribers and optionally persisted to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Amount, DomainName, Identity};

/// Domain event emitted after every successful mutation.
///
/// `sequence` is the global ordinal assigned by the store while it held
/// the write lock, so events sort in the order the mutations happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A name was claimed.
    DomainRegistered {
        /// Claimed name.
        name: DomainName,
        /// New controller.
        controller: Identity,
        /// Amount escrowed.
        deposit: Amount,
        /// Global mutation sequence.
        sequence: u64,
        /// Registration timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A name was released and its deposit refunded.
    DomainReleased {
        /// Released name.
        name: DomainName,
        /// Controller that released it (and received the refund).
        controller: Identity,
        /// Amount refunded, equal to the deposit before the reset.
        refund: Amount,
        /// Global mutation sequence.
        sequence: u64,
        /// Release timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl RegistryEvent {
    /// Returns the domain name this event concerns.
    #[must_use]
    pub fn name(&self) -> &DomainName {
        match self {
            Self::DomainRegistered { name, .. } | Self::DomainReleased { name, .. } => name,
        }
    }

    /// Returns the controller involved in the mutation.
    #[must_use]
    pub fn controller(&self) -> &Identity {
        match self {
            Self::DomainRegistered { controller, .. }
            | Self::DomainReleased { controller, .. } => controller,
        }
    }

    /// Returns the global mutation sequence.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        match self {
            Self::DomainRegistered { sequence, .. } | Self::DomainReleased { sequence, .. } => {
                *sequence
            }
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::DomainRegistered { .. } => "domain_registered",
            Self::DomainReleased { .. } => "domain_released",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn released() -> RegistryEvent {
        let (Ok(name), Ok(controller)) = (DomainName::new("com"), Identity::new("0xa")) else {
            panic!("valid inputs");
        };
        RegistryEvent::DomainReleased {
            name,
            controller,
            refund: Amount::new(100),
            sequence: 2,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn released_event_type() {
        let event = released();
        assert_eq!(event.event_type_str(), "domain_released");
        assert!(matches!(
            event,
            RegistryEvent::DomainReleased { refund, .. } if refund == Amount::new(100)
        ));
        assert_eq!(event.sequence(), 2);
    }

    #[test]
    fn serializes_with_tag_and_string_amount() {
        let json = serde_json::to_string(&released()).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"domain_released\""));
        assert!(json.contains("\"refund\":\"100\""));
        assert!(json.contains("\"name\":\"com\""));
    }
}
