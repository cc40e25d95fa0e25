//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp. Optional on client messages.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-originated message stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error message with a numeric code.
    #[must_use]
    pub fn error(id: impl Into<String>, code: u32, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope payload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific names. Use `["*"]` for all names.
    Subscribe {
        /// Names to subscribe to.
        names: Vec<String>,
    },
    /// Unsubscribe from events for specific names.
    Unsubscribe {
        /// Names to unsubscribe from.
        names: Vec<String>,
    },
    /// Look up a single name (read-only).
    GetDomain {
        /// Name to look up.
        name: String,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn command_parses_from_payload() {
        let payload = serde_json::json!({"command": "subscribe", "names": ["com", "*"]});
        let Ok(cmd) = serde_json::from_value::<WsCommand>(payload) else {
            panic!("valid command");
        };
        assert_eq!(
            cmd,
            WsCommand::Subscribe {
                names: vec!["com".to_string(), "*".to_string()]
            }
        );
    }

    #[test]
    fn envelope_timestamp_is_optional() {
        let raw = r#"{"id":"1","type":"command","payload":{"command":"get_domain","name":"com"}}"#;
        let Ok(msg) = serde_json::from_str::<WsMessage>(raw) else {
            panic!("valid envelope");
        };
        assert_eq!(msg.msg_type, WsMessageType::Command);
    }
}
