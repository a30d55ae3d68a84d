use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use crate::models::message::ServerMessage;
use crate::services::errors::notification_service_errors::NotificationError;

/// Size of the per-connection send buffer.
const CONNECTION_BUFFER_SIZE: usize = 64;

/// Delivers typed messages to individual connections. Each registered
/// connection gets an mpsc channel; a writer task on the transport side
/// drains the receiver into the socket. Delivery is best-effort: a closed
/// channel is reported as `Disconnected` and never retried.
pub struct NotificationService {
    connections: DashMap<String, mpsc::Sender<ServerMessage>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection and hand back the receiving end of its outbound
    /// channel. Registering the same id again replaces the previous channel.
    pub fn register_connection(&self, connection_id: &str) -> mpsc::Receiver<ServerMessage> {
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER_SIZE);
        self.connections.insert(connection_id.to_string(), tx);
        debug!("Registered connection {}", connection_id);
        rx
    }

    pub fn unregister_connection(&self, connection_id: &str) {
        self.connections.remove(connection_id);
        debug!("Unregistered connection {}", connection_id);
    }

    pub async fn send(
        &self,
        connection_id: &str,
        message: ServerMessage,
    ) -> Result<(), NotificationError> {
        // Clone the sender out so no map guard is held across the await.
        let sender = match self.connections.get(connection_id) {
            Some(entry) => entry.value().clone(),
            None => return Err(NotificationError::Disconnected(connection_id.to_string())),
        };

        sender
            .send(message)
            .await
            .map_err(|_| NotificationError::Disconnected(connection_id.to_string()))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}
