#[derive(Debug)]
pub enum NotificationError {
    /// The connection's outbound channel is gone or was never registered.
    /// Callers treat this as a disconnect of that connection.
    Disconnected(String),
}

impl std::fmt::Display for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationError::Disconnected(connection_id) => {
                write!(f, "Connection {} is not reachable", connection_id)
            }
        }
    }
}

impl std::error::Error for NotificationError {}
