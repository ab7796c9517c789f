//! Signaling relay - connection-scoped event routing.
//!
//! The relay binds transport connections to `(room, participant)` pairs and
//! routes every room-scoped and peer-targeted event between them. All state
//! lives in a single [`RelayActor`] task; see [`actor`] for the protocol
//! state machine.

mod actor;

pub use actor::{RelayActor, RelayHandle, RelayStats};

use uuid::Uuid;

use crate::protocol::ServerMessage;

/// Outbound half of one client connection.
///
/// The relay pushes events into this sender; a per-connection writer task
/// drains the other end into the WebSocket. Unbounded so the relay actor
/// never blocks on a slow client.
pub type ClientSender = tokio::sync::mpsc::UnboundedSender<ServerMessage>;

/// Handle to one transport connection: a process-unique id plus the
/// outbound event sender. Cloned freely; the id is the identity.
#[derive(Debug, Clone)]
pub struct ConnectionRef {
    pub id: String,
    pub sender: ClientSender,
}

impl ConnectionRef {
    /// Wrap an outbound sender with a fresh connection id.
    #[must_use]
    pub fn new(sender: ClientSender) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            sender,
        }
    }

    /// Best-effort delivery. A send error only means the connection is
    /// already gone; the disconnect path will clean it up.
    pub fn send(&self, message: ServerMessage) {
        if self.sender.send(message).is_err() {
            tracing::debug!(
                target: "signaling.relay",
                connection_id = %self.id,
                "Dropped event for closed connection"
            );
        }
    }
}
