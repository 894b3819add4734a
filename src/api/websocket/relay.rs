//! Relay WebSocket handler
//!
//! Binary messages go to the UDP target; broadcast frames from the UDP
//! receiver come back through the connection's registry queue.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, trace, warn};

use crate::api::server::AppState;

/// WebSocket handler for relay clients
pub async fn relay_ws(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_relay_ws(socket, peer, state))
}

/// Handle one relay connection until either side closes
async fn handle_relay_ws(socket: WebSocket, peer: SocketAddr, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Registered only once the upgrade completes: no backlog is replayed
    let (guard, mut rx) = state.registry.register();
    let client = guard.id();
    state.stats.record_connection();

    info!(%client, %peer, "Relay WebSocket connected");

    // Drain broadcast frames into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Binary(frame.to_vec())).await.is_err() {
                break;
            }
        }
    });

    // Forward binary messages to UDP in arrival order
    let relay = state.relay.clone();
    let stats = state.stats.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Binary(data)) => {
                    if let Err(e) = relay.forward(&data).await {
                        warn!(%client, "Dropping frame: {}", e);
                    }
                }
                Ok(Message::Text(_)) => {
                    stats.record_ignored();
                    trace!(%client, "Ignoring text message");
                }
                Ok(Message::Close(_)) => {
                    debug!(%client, "Relay WebSocket received close");
                    break;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Pong is handled automatically by axum
                }
                Err(e) => {
                    debug!(%client, "Relay WebSocket error: {}", e);
                    break;
                }
            }
        }
    });

    // Wait for either direction to finish
    tokio::select! {
        _ = &mut send_task => {}
        _ = &mut receive_task => {}
    }

    send_task.abort();
    receive_task.abort();
    let _ = tokio::join!(send_task, receive_task);

    drop(guard);
    info!(%client, %peer, "Relay WebSocket disconnected");
}
