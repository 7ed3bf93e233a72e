use async_trait::async_trait;

use crate::error::TransportError;

/// Write side of one client channel.
///
/// The gateway implements this over an axum WebSocket sink; tests implement it
/// over in-memory buffers. Implementations must serialize concurrent writers
/// in call order so a recipient never sees its envelopes reordered.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write a single text frame.
    async fn send_text(&self, text: String) -> Result<(), TransportError>;
}
