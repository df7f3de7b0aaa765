//! WebSocket upgrade handler and per-connection loop.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, warn};

use super::connection::{ConnectionId, ListenerConnection, ReadyState};
use super::message::{ClientMessage, ServerMessage};
use crate::state::AppState;
use pulse_telemetry::spans::connection_span;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let max_message_size = state.config.websocket.max_message_size;
    ws.max_message_size(max_message_size)
        .on_upgrade(move |socket| {
            let conn_id = ConnectionId::generate();
            handle_socket(socket, conn_id, state).instrument(connection_span(conn_id.as_u64()))
        })
}

/// Handles one listener from registration to removal.
async fn handle_socket(socket: WebSocket, conn_id: ConnectionId, state: Arc<AppState>) {
    let (tx, mut rx) = mpsc::channel::<Arc<str>>(state.config.websocket.max_queue_size);
    let connection = Arc::new(ListenerConnection::new(conn_id, tx));

    if let Err(e) = state.registry().register(Arc::clone(&connection)) {
        warn!(error = %e, "Connection rejected");
        return;
    }
    info!(connections = state.registry().size(), "Listener connected");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // The greeting goes out before the connection is marked open so that no
    // signal can overtake it.
    let greeting = serde_json::to_string(&ServerMessage::welcome(conn_id.to_string()));
    let greeted = match greeting {
        Ok(json) => ws_sender.send(Message::Text(json.into())).await.is_ok(),
        Err(_) => false,
    };
    if !greeted {
        warn!("Failed to greet listener");
        state.registry().unregister(conn_id);
        return;
    }
    connection.set_ready_state(ReadyState::Open);

    let send_task = tokio::spawn(
        async move {
            while let Some(payload) = rx.recv().await {
                if ws_sender
                    .send(Message::Text(payload.to_string().into()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        }
        .in_current_span(),
    );

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_text_message(text.as_str(), &connection, &state);
            }
            Ok(Message::Close(_)) => {
                debug!("Close requested");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "WebSocket error");
                break;
            }
        }
    }

    connection.set_ready_state(ReadyState::Closed);
    state.registry().unregister(conn_id);
    send_task.abort();
    info!(connections = state.registry().size(), "Listener disconnected");
}

fn handle_text_message(text: &str, connection: &ListenerConnection, state: &AppState) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Hello { client, .. }) => {
            info!(client = %client, "Listener identified");
        }
        Ok(ClientMessage::Ping { .. }) => {
            if state.config.websocket.echo_pings {
                reply(connection, &ServerMessage::pong());
            }
        }
        Err(e) => {
            debug!(error = %e, "Ignoring unrecognized client message");
        }
    }
}

fn reply(connection: &ListenerConnection, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            if let Err(e) = connection.try_deliver(Arc::from(json)) {
                debug!(error = %e, "Reply dropped");
            }
        }
        Err(e) => warn!(error = %e, "Failed to serialize reply"),
    }
}
