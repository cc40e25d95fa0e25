//! End-to-end WebSocket tests: subscriptions and event delivery.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_json(ws: &mut Socket) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await
        else {
            panic!("no message within timeout");
        };
        if let Ok(text) = msg.to_text()
            && !text.is_empty()
        {
            return serde_json::from_str(text).unwrap_or(Value::Null);
        }
    }
}

async fn send(ws: &mut Socket, payload: Value) {
    let envelope = json!({"id": "t", "type": "command", "payload": payload});
    if ws.send(Message::text(envelope.to_string())).await.is_err() {
        panic!("send failed");
    }
}

#[tokio::test]
async fn subscriber_sees_only_its_names() {
    let addr = common::spawn_app().await;
    let Ok((mut ws, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };

    send(&mut ws, json!({"command": "subscribe", "names": ["com"]})).await;
    let ack = next_json(&mut ws).await;
    assert_eq!(ack["type"], "response");
    assert_eq!(ack["payload"]["subscribed"], json!(["com"]));

    let client = reqwest::Client::new();
    for name in ["org", "com"] {
        let Ok(resp) = client
            .post(format!("http://{addr}/api/v1/domains"))
            .json(&json!({"name": name, "caller": "0xa", "payment": "100"}))
            .send()
            .await
        else {
            panic!("register failed");
        };
        assert_eq!(resp.status().as_u16(), 201);
    }

    let event = next_json(&mut ws).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["event_type"], "domain_registered");
    assert_eq!(event["payload"]["name"], "com");
    assert_eq!(event["payload"]["deposit"], "100");
    assert_eq!(event["payload"]["sequence"], 2);
}

#[tokio::test]
async fn get_domain_over_websocket() {
    let addr = common::spawn_app().await;
    let Ok((mut ws, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };

    send(&mut ws, json!({"command": "get_domain", "name": "nobody"})).await;
    let resp = next_json(&mut ws).await;
    assert_eq!(resp["payload"]["is_registered"], false);
    assert_eq!(resp["payload"]["deposit"], "0");
    assert_eq!(resp["payload"]["controller"], Value::Null);
}
