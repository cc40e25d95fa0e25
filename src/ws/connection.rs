//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{DomainName, RegistryEvent};
use crate::service::RegistryService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<RegistryEvent>,
    registry_service: Arc<RegistryService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &registry_service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(registry_event) => {
                        if subs.matches(registry_event.name()) {
                            let msg = WsMessage::new(
                                uuid::Uuid::new_v4().to_string(),
                                WsMessageType::Event,
                                serde_json::to_value(&registry_event).unwrap_or_default(),
                            );
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    registry_service: &RegistryService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error("", 400, "malformed JSON")).ok();
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let response = match command {
        WsCommand::Subscribe { names } => {
            let (names, wildcard) = parse_names(&names);
            subs.subscribe(&names, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": names,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { names } => {
            let (names, wildcard) = parse_names(&names);
            subs.unsubscribe(&names, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": names,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetDomain { name } => match DomainName::new(name) {
            Ok(name) => {
                let info = registry_service.domain_info(&name).await;
                WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::json!({
                        "name": name,
                        "controller": info.controller,
                        "deposit": info.deposit,
                        "is_registered": info.is_registered,
                    }),
                )
            }
            Err(e) => WsMessage::error(msg.id, 400, &e.to_string()),
        },
    };

    serde_json::to_string(&response).ok()
}

/// Splits raw subscription targets into valid names and the wildcard flag.
/// Empty strings are skipped.
fn parse_names(raw: &[String]) -> (Vec<DomainName>, bool) {
    let mut wildcard = false;
    let mut names = Vec::with_capacity(raw.len());
    for s in raw {
        if s == "*" {
            wildcard = true;
        } else if let Ok(name) = DomainName::new(s.as_str()) {
            names.push(name);
        }
    }
    (names, wildcard)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::{Amount, DomainStore, EventBus, Identity};

    fn service() -> RegistryService {
        RegistryService::new(
            Arc::new(DomainStore::new(Amount::new(100))),
            EventBus::new(16),
        )
    }

    fn parse(json: Option<String>) -> serde_json::Value {
        let Some(json) = json else {
            panic!("expected a response");
        };
        serde_json::from_str(&json).unwrap_or_default()
    }

    #[tokio::test]
    async fn subscribe_with_wildcard() {
        let mut subs = SubscriptionManager::new();
        let resp = handle_text_message(
            r#"{"id":"1","type":"command","payload":{"command":"subscribe","names":["com","*",""]}}"#,
            &mut subs,
            &service(),
        )
        .await;
        let resp = parse(resp);
        assert_eq!(resp["type"], "response");
        assert_eq!(resp["payload"]["subscribed"], serde_json::json!(["com"]));
        assert_eq!(resp["payload"]["wildcard"], true);
        assert!(subs.is_subscribed_all());
    }

    #[tokio::test]
    async fn get_domain_returns_info() {
        let service = service();
        let (Ok(name), Ok(caller)) = (DomainName::new("com"), Identity::new("0xa")) else {
            panic!("valid inputs");
        };
        let _ = service.register(name, caller, Amount::new(150)).await;

        let mut subs = SubscriptionManager::new();
        let resp = handle_text_message(
            r#"{"id":"7","type":"command","payload":{"command":"get_domain","name":"com"}}"#,
            &mut subs,
            &service,
        )
        .await;
        let resp = parse(resp);
        assert_eq!(resp["id"], "7");
        assert_eq!(resp["payload"]["controller"], "0xa");
        assert_eq!(resp["payload"]["deposit"], "150");
        assert_eq!(resp["payload"]["is_registered"], true);
    }

    #[tokio::test]
    async fn malformed_and_unknown_messages_yield_errors() {
        let mut subs = SubscriptionManager::new();
        let service = service();

        let resp = parse(handle_text_message("not json", &mut subs, &service).await);
        assert_eq!(resp["type"], "error");
        assert_eq!(resp["payload"]["code"], 400);

        let resp = parse(
            handle_text_message(
                r#"{"id":"2","type":"command","payload":{"command":"transfer"}}"#,
                &mut subs,
                &service,
            )
            .await,
        );
        assert_eq!(resp["payload"]["code"], 404);
    }
}
