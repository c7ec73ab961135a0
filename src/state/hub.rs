//! Broadcast hub fanning server events out to every connected socket.

use tokio::sync::broadcast;
use tracing::trace;

use crate::dto::ws::ServerMessage;

/// Buffered broadcast channel capacity. Slow consumers past this lag are
/// disconnected by the receiver side.
const CHANNEL_CAPACITY: usize = 256;

/// Fan-out channel for server events.
///
/// Cloning the hub is cheap; every websocket connection subscribes once and
/// forwards received messages to its peer.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<ServerMessage>,
}

impl EventHub {
    /// Create a hub with the default capacity.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe a new consumer. Only events sent after this call are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.sender.subscribe()
    }

    /// Broadcast an event to all current subscribers.
    ///
    /// A hub without subscribers simply drops the event.
    pub fn publish(&self, message: ServerMessage) {
        match self.sender.send(message) {
            Ok(count) => trace!(subscribers = count, "event published"),
            Err(_) => trace!("event dropped, no subscribers"),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
