use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::debug;

use crate::app::AppState;
use crate::ws::send::WsTransport;

/// Axum handler — upgrades HTTP to WebSocket at GET /websocket.
///
/// Connections from any origin are accepted.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| run_connection(socket, state))
}

/// Per-connection event loop — lives for the entire WS session.
///
/// Inbound frames are handled one at a time, and each broadcast is queued for
/// every recipient before the next frame is read, which keeps this client's
/// messages in order everywhere. Pings are answered by the socket itself.
async fn run_connection(socket: WebSocket, state: Arc<AppState>) {
    let (tx, mut rx) = socket.split();
    let conn = state.hub.connection(Box::new(WsTransport::new(tx)));

    if state.hub.open(&conn).is_none() {
        return;
    }

    while let Some(msg) = rx.next().await {
        match msg {
            // protocol errors are logged inside the hub; the connection stays up
            Ok(Message::Text(text)) => {
                let _ = state.hub.receive(&conn, text.as_str().as_bytes());
            }
            Ok(Message::Binary(data)) => {
                let _ = state.hub.receive(&conn, &data);
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!(conn_id = %conn.id, error = %e, "WS read error");
                break;
            }
        }
    }

    state.hub.close(&conn);
}
