//! Connection lifecycle and fan-out delivery.
//!
//! A connection goes through [`Hub::open`] once, [`Hub::receive`] for every
//! inbound frame, and [`Hub::close`] when its transport ends. Broadcasts
//! address the registry members present when the broadcast starts. Each
//! recipient has its own bounded queue and writer task, so a recipient that
//! stops reading never holds up delivery to the others.

use std::sync::Arc;

use chatter_core::config::HubConfig;
use chatter_protocol::{ClientFrame, FrameError, ServerFrame};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::connection::{run_writer, ConnState, Connection};
use crate::identity;
use crate::registry::Registry;
use crate::transport::Transport;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Members in the snapshot taken when the broadcast began.
    pub recipients: usize,
    /// Envelopes accepted into a recipient's outbound queue.
    pub delivered: usize,
    pub failed: usize,
}

/// Registry plus the open/receive/close/broadcast operations over it.
pub struct Hub {
    registry: Registry,
    delivery_timeout_ms: u64,
    max_payload_bytes: usize,
    outbound_queue: usize,
}

impl Hub {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            registry: Registry::new(),
            delivery_timeout_ms: config.delivery_timeout_ms,
            max_payload_bytes: config.max_payload_bytes,
            // mpsc::channel rejects a zero capacity
            outbound_queue: config.outbound_queue.max(1),
        }
    }

    /// Wrap an accepted transport in a new, unopened connection and start its
    /// writer task. The writer ends once the connection is dropped.
    pub fn connection(&self, transport: Box<dyn Transport>) -> Arc<Connection> {
        let (tx, rx) = mpsc::channel(self.outbound_queue);
        let conn = Arc::new(Connection::new(tx));
        tokio::spawn(run_writer(conn.id.clone(), rx, transport, self.delivery_timeout_ms));
        conn
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Assign a display name, queue the `name` envelope, register.
    ///
    /// The `name` envelope is queued before the connection becomes visible to
    /// broadcasts, so it is always the first frame the client sees. Returns
    /// `None` if the connection was not in the `Unopened` state.
    pub fn open(&self, conn: &Arc<Connection>) -> Option<String> {
        let name = identity::generate_name();
        if !conn.mark_open(name.clone()) {
            warn!(conn_id = %conn.id, state = ?conn.state(), "open on a connection that is not new");
            return None;
        }
        info!(conn_id = %conn.id, name = %name, "new connection opened");

        // Failure here is the usual recoverable "peer already gone"; the
        // transport's own close event will clean up.
        let _ = conn.deliver(&ServerFrame::name(name.clone()));

        self.admit(conn);
        Some(name)
    }

    /// Register an opened connection. Returns false, leaving it unregistered,
    /// if its close event landed first.
    fn admit(&self, conn: &Arc<Connection>) -> bool {
        self.registry.register(Arc::clone(conn));
        // close may have raced the registration
        if conn.state() == ConnState::Closed {
            self.registry.unregister(&conn.id);
            return false;
        }
        true
    }

    /// Handle one inbound payload.
    ///
    /// Protocol errors are logged and returned; the connection stays open and
    /// nothing is broadcast. Returns `Ok(None)` if the connection is not open.
    pub fn receive(
        &self,
        conn: &Connection,
        raw: &[u8],
    ) -> Result<Option<BroadcastReport>, FrameError> {
        let (true, Some(name)) = (conn.is_open(), conn.name()) else {
            debug!(conn_id = %conn.id, state = ?conn.state(), "ignoring frame on inactive connection");
            return Ok(None);
        };

        let frame = match ClientFrame::parse_bytes(raw, self.max_payload_bytes) {
            Ok(f) => f,
            Err(e) => {
                error!(conn_id = %conn.id, name = %name, error = %e, "invalid message received");
                return Err(e);
            }
        };

        Ok(Some(self.broadcast(name, &frame.message)))
    }

    /// Deregister. Safe to call repeatedly, and before `open`.
    pub fn close(&self, conn: &Connection) {
        let previous = conn.mark_closed();
        self.registry.unregister(&conn.id);
        match previous {
            ConnState::Open => {
                info!(conn_id = %conn.id, name = conn.name().unwrap_or(""), "connection closed")
            }
            ConnState::Unopened => debug!(conn_id = %conn.id, "connection closed before open"),
            ConnState::Closed => debug!(conn_id = %conn.id, "close signalled twice"),
        }
    }

    /// Queue `text` from `sender` for every current member.
    ///
    /// Never waits on a socket. A recipient whose queue is full or whose
    /// writer has stopped counts as failed and is not removed here.
    pub fn broadcast(&self, sender: &str, text: &str) -> BroadcastReport {
        let members = self.registry.snapshot();
        let recipients = members.len();

        let (own, other) = match (
            ServerFrame::message(sender, text, true).to_json(),
            ServerFrame::message(sender, text, false).to_json(),
        ) {
            (Ok(own), Ok(other)) => (own, other),
            (Err(e), _) | (_, Err(e)) => {
                error!(sender, error = %e, "failed to serialize broadcast");
                return BroadcastReport {
                    recipients,
                    delivered: 0,
                    failed: recipients,
                };
            }
        };

        let mut delivered = 0;
        for member in &members {
            let payload = if member.name() == Some(sender) {
                own.clone()
            } else {
                other.clone()
            };
            if member.deliver_text(payload).is_ok() {
                delivered += 1;
            }
        }

        let report = BroadcastReport {
            recipients,
            delivered,
            failed: recipients - delivered,
        };
        debug!(sender, recipients, delivered, failed = report.failed, "broadcast message");
        report
    }
}
