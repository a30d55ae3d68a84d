use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::models::game_session::GameSession;
use crate::models::message::ServerMessage;
use crate::repositories::session_registry::SessionRegistry;
use crate::services::notification_service::NotificationService;

/// What a paired connection needs to know about itself.
#[derive(Debug)]
pub struct MatchAssignment {
    pub session_id: String,
    pub player_id: String,
}

pub enum MatchOutcome {
    /// Parked in the waiting slot. The receiver fires when an opponent
    /// arrives and carries this connection's assignment.
    Waiting(oneshot::Receiver<MatchAssignment>),

    /// Paired against the previously waiting connection. The caller owns
    /// announcing the match and starting the first round.
    Paired {
        session: GameSession,
        assignment: MatchAssignment,
    },
}

struct WaitingConnection {
    connection_id: String,
    wake: oneshot::Sender<MatchAssignment>,
}

/// Single-slot matchmaker: holds at most one waiting connection and pairs it
/// with the next arrival. The slot check and mutation happen under one mutex
/// acquisition with no suspension point, so two arrivals can never both see
/// an empty slot or both consume the same waiter.
pub struct MatchmakingService {
    registry: Arc<SessionRegistry>,
    notifier: Arc<NotificationService>,
    waiting: Mutex<Option<WaitingConnection>>,
}

impl MatchmakingService {
    pub fn new(registry: Arc<SessionRegistry>, notifier: Arc<NotificationService>) -> Self {
        MatchmakingService {
            registry,
            notifier,
            waiting: Mutex::new(None),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<WaitingConnection>> {
        self.waiting.lock().expect("matchmaking slot lock poisoned")
    }

    /// Offer a connection for pairing. Re-offering the identity already in
    /// the slot keeps it waiting rather than pairing it with itself.
    pub async fn offer(&self, connection_id: &str) -> MatchOutcome {
        // Local decision computed entirely under the mutex with no suspension
        // point; the guard is fully released before any `.await` below.
        enum Decision {
            Park(oneshot::Receiver<MatchAssignment>),
            Pair(WaitingConnection),
        }

        let decision = {
            let mut slot = self.slot();
            match slot.take() {
                Some(w) if w.connection_id != connection_id => Decision::Pair(w),
                previous => {
                    // Slot empty (or held by this same connection): park and
                    // hand out a fresh wake signal.
                    drop(previous);
                    let (tx, rx) = oneshot::channel();
                    *slot = Some(WaitingConnection {
                        connection_id: connection_id.to_string(),
                        wake: tx,
                    });
                    Decision::Park(rx)
                }
            }
        };

        let waiting = match decision {
            Decision::Pair(w) => w,
            Decision::Park(rx) => {
                debug!("Connection {} is waiting for an opponent", connection_id);
                if let Err(e) = self
                    .notifier
                    .send(
                        connection_id,
                        ServerMessage::Waiting {
                            message: "Waiting for opponent...".to_string(),
                        },
                    )
                    .await
                {
                    debug!("Could not notify waiting connection: {}", e);
                }
                return MatchOutcome::Waiting(rx);
            }
        };

        // Slot already cleared above; create the session with the earlier
        // arrival as player 1.
        let session = self
            .registry
            .create_session(&waiting.connection_id, connection_id);

        info!(
            "Paired connections {} and {} into session {}",
            waiting.connection_id, connection_id, session.session_id
        );

        let waiter_assignment = MatchAssignment {
            session_id: session.session_id.clone(),
            player_id: session.players[0].player_id.clone(),
        };
        if waiting.wake.send(waiter_assignment).is_err() {
            // The waiter's task is already gone; its delivery failures will
            // tear the session down through the disconnect path.
            warn!(
                "Waiting connection {} vanished before pairing completed",
                waiting.connection_id
            );
        }

        let assignment = MatchAssignment {
            session_id: session.session_id.clone(),
            player_id: session.players[1].player_id.clone(),
        };
        MatchOutcome::Paired {
            session,
            assignment,
        }
    }

    /// Clear the slot iff it still holds this connection. Returns whether the
    /// slot was cleared; `false` means the connection was never waiting or
    /// was already consumed by a pairing.
    pub fn withdraw(&self, connection_id: &str) -> bool {
        let mut slot = self.slot();
        match slot.as_ref() {
            Some(w) if w.connection_id == connection_id => {
                *slot = None;
                debug!("Connection {} withdrew from matchmaking", connection_id);
                true
            }
            _ => false,
        }
    }

    pub fn has_waiting(&self) -> bool {
        self.slot().is_some()
    }
}
