use axum::extract::ws::{Message, WebSocket};
use chatter_hub::{Transport, TransportError};
use futures_util::{stream::SplitSink, SinkExt};
use tokio::sync::Mutex;

/// Write half of an axum WebSocket.
///
/// Owned by the connection's writer task, which issues one write at a time;
/// the mutex only lends the sink out through `&self`.
pub struct WsTransport {
    sink: Mutex<SplitSink<WebSocket, Message>>,
}

impl WsTransport {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }
}

#[async_trait::async_trait]
impl Transport for WsTransport {
    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        let mut guard = self.sink.lock().await;
        guard
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::Failed(e.to_string()))
    }
}
