use chatter_core::ConnId;
use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport) write.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer (or our side) already closed the channel.
    #[error("transport closed")]
    Closed,

    /// Any other write failure from the underlying socket.
    #[error("transport write failed: {0}")]
    Failed(String),
}

/// Why a single envelope did not reach a single recipient.
///
/// Always recoverable: the caller counts it and moves on to the next recipient.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Connection is not in the `Open` state.
    #[error("connection {conn_id} is not open")]
    Closed { conn_id: ConnId },

    /// The client's outbound queue is full; this envelope is dropped for it.
    #[error("outbound queue for {conn_id} is full ({capacity} pending)")]
    QueueFull { conn_id: ConnId, capacity: usize },

    /// The write did not finish within the configured bound.
    #[error("delivery to {conn_id} timed out after {ms}ms")]
    Timeout { conn_id: ConnId, ms: u64 },

    #[error("delivery to {conn_id} failed: {source}")]
    Transport {
        conn_id: ConnId,
        #[source]
        source: TransportError,
    },

    #[error("envelope serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
