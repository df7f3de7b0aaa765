//! Full server lifecycle over a real socket.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use pulse_server::{PulseServer, ServerConfig, ServerState};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_serves_periodic_signals_until_shutdown() {
    let mut config = ServerConfig::default();
    config.generator.tick_interval_secs = 1;
    config.generator.probability = 1.0;
    config.generator.seed = Some(42);
    config.shutdown.timeout_secs = 2;

    let mut server = PulseServer::new(config);
    server.initialize().await.unwrap();
    let server = Arc::new(server);
    let controller = server.shutdown_controller().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let running = Arc::clone(&server);
    let task = tokio::spawn(async move { running.serve(listener).await });

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let ping = json!({"type": "ping", "timestamp": "2024-05-01T12:00:00.000Z"});
    ws.send(Message::Text(ping.to_string().into())).await.unwrap();

    let mut kinds = Vec::new();
    let signal = timeout(TIMEOUT, async {
        loop {
            let Some(Ok(Message::Text(text))) = ws.next().await else {
                panic!("connection ended before a signal arrived");
            };
            let value: Value = serde_json::from_str(text.as_str()).unwrap();
            let kind = value["type"].as_str().unwrap_or_default().to_string();
            if kind == "buy" || kind == "sell" {
                return value;
            }
            kinds.push(kind);
        }
    })
    .await
    .expect("no periodic signal within the timeout");

    assert_eq!(kinds.first().map(String::as_str), Some("welcome"));
    assert_eq!(signal["status"], "active");
    assert_eq!(signal["timeframe"], "D1");
    assert!(signal["entryPrice"].as_f64().unwrap() > 0.0);
    assert_eq!(server.state().await, ServerState::Running);

    server.shutdown();
    let result = timeout(TIMEOUT, task).await.unwrap().unwrap();
    assert!(result.is_ok());
    assert_eq!(server.state().await, ServerState::Stopped);
    assert!(controller.wait_for_completion(Duration::from_millis(100)).await);
}
