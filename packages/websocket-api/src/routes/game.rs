use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use tracing::info;
use uuid::Uuid;

use crate::connection;
use crate::state::AppState;

/// WebSocket upgrade for the game endpoint.
///
/// GET /ws/game
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    // Connection identity is minted here and lives for the socket's lifetime.
    let connection_id = Uuid::new_v4().to_string();
    info!("WebSocket upgrade request, connection {}", connection_id);

    ws.on_upgrade(move |socket| connection::handle_connection(socket, connection_id, state))
}
