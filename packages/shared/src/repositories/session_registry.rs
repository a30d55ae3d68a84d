use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::models::game_session::{GameSession, SessionStatus};

/// Both indices live under one mutex so they can never diverge: every
/// connection id in `connection_to_session` resolves to a session holding a
/// matching player, and removal updates both sides in one step.
#[derive(Default)]
struct RegistryIndices {
    sessions: HashMap<String, GameSession>,
    connection_to_session: HashMap<String, String>,
}

/// Owns the mapping from connection identity to session and from session
/// identity to its two players. All lookups are total; asking about an
/// unknown identity yields `None`, never an error.
///
/// Critical sections are sync-only. Guards are released before any network
/// delivery, which is what makes the round check-and-set sequences
/// indivisible with respect to task interleaving.
pub struct SessionRegistry {
    inner: Mutex<RegistryIndices>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryIndices::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryIndices> {
        self.inner.lock().expect("session registry lock poisoned")
    }

    /// Create a session for the two connections and index both of them.
    /// Returns a snapshot of the new session.
    pub fn create_session(&self, connection_id_1: &str, connection_id_2: &str) -> GameSession {
        let session = GameSession::new(connection_id_1, connection_id_2);

        let mut indices = self.lock();
        for player in &session.players {
            indices
                .connection_to_session
                .insert(player.connection_id.clone(), session.session_id.clone());
        }
        indices
            .sessions
            .insert(session.session_id.clone(), session.clone());
        drop(indices);

        info!(
            "Created session {} for connections {} and {}",
            session.session_id, connection_id_1, connection_id_2
        );
        session
    }

    pub fn session_of(&self, connection_id: &str) -> Option<String> {
        self.lock().connection_to_session.get(connection_id).cloned()
    }

    /// The other player's connection id, if the given connection is in a
    /// session.
    pub fn opponent_of(&self, connection_id: &str) -> Option<String> {
        let indices = self.lock();
        let session_id = indices.connection_to_session.get(connection_id)?;
        let session = indices.sessions.get(session_id)?;
        session
            .opponent_of_connection(connection_id)
            .map(|p| p.connection_id.clone())
    }

    pub fn get_session(&self, session_id: &str) -> Option<GameSession> {
        self.lock().sessions.get(session_id).cloned()
    }

    /// Remove the session and the index entries of both its players in one
    /// step. Idempotent: terminating an unknown or already-terminated session
    /// is a no-op returning `None`. The returned snapshot is marked
    /// `Terminated`.
    pub fn terminate(&self, session_id: &str) -> Option<GameSession> {
        let mut indices = self.lock();
        let mut session = indices.sessions.remove(session_id)?;
        for player in &session.players {
            indices.connection_to_session.remove(&player.connection_id);
        }
        drop(indices);

        session.status = SessionStatus::Terminated;
        debug!("Terminated session {}", session_id);
        Some(session)
    }

    /// Run a mutation against the stored session inside the registry lock.
    /// The closure must stay sync; the outcome it computes is acted on (sends,
    /// spawns) only after the lock is released.
    pub fn with_session_mut<R>(
        &self,
        session_id: &str,
        mutate: impl FnOnce(&mut GameSession) -> R,
    ) -> Option<R> {
        let mut indices = self.lock();
        indices.sessions.get_mut(session_id).map(mutate)
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
