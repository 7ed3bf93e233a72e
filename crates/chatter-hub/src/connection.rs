use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use chatter_core::ConnId;
use chatter_protocol::ServerFrame;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::error::DeliveryError;
use crate::transport::Transport;

/// Connection lifecycle — linear progression, no backwards transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnState {
    Unopened = 0,
    Open = 1,
    Closed = 2,
}

impl ConnState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => ConnState::Unopened,
            1 => ConnState::Open,
            _ => ConnState::Closed,
        }
    }
}

/// Server-side representative of one client channel.
///
/// Envelopes go into a bounded queue drained by [`run_writer`], so a client
/// that stops reading only fills its own queue.
pub struct Connection {
    pub id: ConnId,
    name: OnceLock<String>,
    state: AtomicU8,
    outbound: mpsc::Sender<String>,
}

impl Connection {
    pub fn new(outbound: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnId::new(),
            name: OnceLock::new(),
            state: AtomicU8::new(ConnState::Unopened as u8),
            outbound,
        }
    }

    /// Display name, set once by [`Hub::open`](crate::hub::Hub::open).
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    pub fn state(&self) -> ConnState {
        ConnState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnState::Open
    }

    /// Unopened → Open. Returns false if the connection was already opened or closed.
    pub(crate) fn mark_open(&self, name: String) -> bool {
        let opened = self
            .state
            .compare_exchange(
                ConnState::Unopened as u8,
                ConnState::Open as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if opened {
            let _ = self.name.set(name);
        }
        opened
    }

    /// Any state → Closed. Returns the state it left.
    pub(crate) fn mark_closed(&self) -> ConnState {
        ConnState::from_u8(self.state.swap(ConnState::Closed as u8, Ordering::AcqRel))
    }

    /// Serialize one envelope and queue it for this client.
    pub fn deliver(&self, frame: &ServerFrame) -> Result<(), DeliveryError> {
        let text = frame.to_json()?;
        self.deliver_text(text)
    }

    /// Queue pre-serialized JSON without waiting on the socket. Failures are
    /// logged here and returned so the caller can count them; none of them
    /// are fatal.
    pub(crate) fn deliver_text(&self, text: String) -> Result<(), DeliveryError> {
        if !self.is_open() {
            warn!(conn_id = %self.id, name = self.name().unwrap_or(""), "connection closed when trying to send message");
            return Err(DeliveryError::Closed {
                conn_id: self.id.clone(),
            });
        }

        match self.outbound.try_send(text) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                let capacity = self.outbound.max_capacity();
                warn!(conn_id = %self.id, name = self.name().unwrap_or(""), capacity, "outbound queue full, dropping message");
                Err(DeliveryError::QueueFull {
                    conn_id: self.id.clone(),
                    capacity,
                })
            }
            Err(TrySendError::Closed(_)) => {
                warn!(conn_id = %self.id, name = self.name().unwrap_or(""), "writer gone when trying to send message");
                Err(DeliveryError::Closed {
                    conn_id: self.id.clone(),
                })
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("state", &self.state())
            .finish()
    }
}

/// Drain one client's outbound queue into its transport, one write at a time.
///
/// A write that exceeds `timeout_ms` drops that envelope and draining goes on.
/// Returns once every sender is gone or the transport reports an error.
pub async fn run_writer(
    conn_id: ConnId,
    mut outbound: mpsc::Receiver<String>,
    transport: Box<dyn Transport>,
    timeout_ms: u64,
) {
    let timeout = Duration::from_millis(timeout_ms);
    while let Some(text) = outbound.recv().await {
        let failure = match tokio::time::timeout(timeout, transport.send_text(text)).await {
            Ok(Ok(())) => continue,
            Ok(Err(source)) => DeliveryError::Transport {
                conn_id: conn_id.clone(),
                source,
            },
            Err(_) => DeliveryError::Timeout {
                conn_id: conn_id.clone(),
                ms: timeout_ms,
            },
        };
        warn!(conn_id = %conn_id, error = %failure, "send to client failed");
        if matches!(failure, DeliveryError::Transport { .. }) {
            break;
        }
    }
    debug!(conn_id = %conn_id, "writer stopped");
}
