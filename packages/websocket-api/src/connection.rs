//! Per-connection control loop: matchmaking hand-off, then the in-match
//! read loop. All outbound traffic flows through the notification channel so
//! game logic never touches the socket directly.

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use shared::models::message::ClientMessage;
use shared::services::matchmaking_service::{MatchAssignment, MatchOutcome};

use crate::state::AppState;

pub async fn handle_connection(socket: WebSocket, connection_id: String, state: AppState) {
    let (mut sink, mut stream) = socket.split();

    let mut outbound = state
        .notification_service
        .register_connection(&connection_id);

    // Writer task: drain the outbound channel into the socket.
    let writer_connection_id = connection_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(json)).await.is_err() {
                debug!("Connection {} writer closed", writer_connection_id);
                break;
            }
        }
    });

    let assignment = match state.matchmaking_service.offer(&connection_id).await {
        MatchOutcome::Paired {
            session,
            assignment,
        } => {
            state.game_session_service.begin_match(&session).await;
            Some(assignment)
        }
        MatchOutcome::Waiting(wake) => wait_for_match(&mut stream, wake, &connection_id, &state).await,
    };

    if let Some(assignment) = &assignment {
        read_loop(&mut stream, assignment, &connection_id, &state).await;
    }

    // No-op for connections that never got matched; otherwise tears the
    // session down and tells the opponent.
    state
        .game_session_service
        .handle_disconnect(&connection_id)
        .await;
    state
        .notification_service
        .unregister_connection(&connection_id);
    writer.abort();
    info!("Connection {} closed", connection_id);
}

/// Park until the matchmaker fires the wake signal, racing it against socket
/// closure. If the socket drops in the same instant the connection is paired,
/// the assignment is still returned so the normal disconnect path can clean
/// the fresh session up.
async fn wait_for_match(
    stream: &mut SplitStream<WebSocket>,
    mut wake: oneshot::Receiver<MatchAssignment>,
    connection_id: &str,
    state: &AppState,
) -> Option<MatchAssignment> {
    loop {
        tokio::select! {
            assignment = &mut wake => {
                return assignment.ok();
            }
            inbound = stream.next() => {
                match inbound {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => {
                        if state.matchmaking_service.withdraw(connection_id) {
                            return None;
                        }
                        // The slot was already consumed: a pairing is
                        // committing right now, and its wake signal follows
                        // without an intervening suspension point.
                        debug!(
                            "Connection {} closed just as it was paired",
                            connection_id
                        );
                        return wake.await.ok();
                    }
                    Some(Ok(_)) => {
                        debug!(
                            "Connection {}: ignoring message received before match",
                            connection_id
                        );
                    }
                }
            }
        }
    }
}

async fn read_loop(
    stream: &mut SplitStream<WebSocket>,
    assignment: &MatchAssignment,
    connection_id: &str,
    state: &AppState,
) {
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => dispatch_message(message, assignment, state).await,
                Err(e) => {
                    debug!(
                        "Connection {}: ignoring malformed message: {}",
                        connection_id, e
                    );
                }
            },
            Ok(Message::Close(_)) => {
                info!("Connection {} closed the socket", connection_id);
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Binary(_)) => {
                debug!("Connection {}: ignoring binary message", connection_id);
            }
            Err(e) => {
                debug!("Connection {} transport error: {}", connection_id, e);
                break;
            }
        }
    }
}

/// Inbound events claiming a session or player the connection was not
/// assigned are dropped; a stale or misbehaving client must not be able to
/// touch another session's state.
async fn dispatch_message(message: ClientMessage, assignment: &MatchAssignment, state: &AppState) {
    match message {
        ClientMessage::Answer {
            game_id,
            player_id,
            question_id,
            answer,
        } => {
            if game_id != assignment.session_id || player_id != assignment.player_id {
                debug!("Ignoring answer aimed at session {}", game_id);
                return;
            }
            state
                .game_session_service
                .handle_answer(
                    &assignment.session_id,
                    &assignment.player_id,
                    question_id,
                    &answer,
                )
                .await;
        }
        ClientMessage::Ready { game_id, player_id } => {
            if game_id != assignment.session_id || player_id != assignment.player_id {
                debug!("Ignoring ready aimed at session {}", game_id);
                return;
            }
            state
                .game_session_service
                .handle_ready(&assignment.session_id, &assignment.player_id)
                .await;
        }
    }
}
