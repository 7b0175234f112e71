use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::registry::{ConnectionRegistry, DashboardConnection};
use crate::state::AppState;

/// Longest a single frame write may take before the client is dropped.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Dashboard push endpoint
pub async fn dashboard_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    debug!("New dashboard WebSocket connection attempt");
    let registry = state.notifier.registry().clone();
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// Track one dashboard client from handshake to close
async fn handle_socket(socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let (conn, mut queue) = DashboardConnection::open();
    let conn_id = conn.id();
    registry.register(conn).await;
    info!("Dashboard connection {} established", conn_id);

    let (mut sender, mut receiver) = socket.split();

    // Forward queued totals to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = queue.recv().await {
            match timeout(SEND_TIMEOUT, sender.send(Message::Text(payload.to_string()))).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => break,
                Err(_) => {
                    warn!("Dashboard connection {} stalled, dropping it", conn_id);
                    break;
                }
            }
        }
    });

    // Dashboards never talk back; only watch for the close
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    registry.unregister(conn_id).await;
    info!("Dashboard connection {} terminated", conn_id);
}
