use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Forming,
    Active,
    Terminated,
}

/// One of the two connections bound to a session. Player ids are minted per
/// session and are distinct from the connection identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub connection_id: String,
    pub score: u32,
    pub ready: bool,
}

impl Player {
    pub fn new(connection_id: &str) -> Self {
        Player {
            player_id: Uuid::new_v4().to_string(),
            connection_id: connection_id.to_string(),
            score: 0,
            ready: false,
        }
    }
}

/// One question-answer cycle. The stored `answer` never leaves the server.
/// Once `resolved` is set, no further submission may change scores or advance
/// the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub question_id: u32,
    pub question: String,
    pub answer: String,
    pub time_limit_secs: u64,
    pub resolved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub session_id: String,
    pub players: [Player; 2],
    pub round: u32,
    pub current_round: Option<Round>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl GameSession {
    /// The first connection offered becomes player 1.
    pub fn new(connection_id_1: &str, connection_id_2: &str) -> Self {
        GameSession {
            session_id: Uuid::new_v4().to_string(),
            players: [Player::new(connection_id_1), Player::new(connection_id_2)],
            round: 0,
            current_round: None,
            status: SessionStatus::Forming,
            created_at: Utc::now(),
        }
    }

    pub fn player_index_by_id(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.player_id == player_id)
    }

    pub fn player_by_connection(&self, connection_id: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.connection_id == connection_id)
    }

    pub fn opponent_of_connection(&self, connection_id: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.connection_id != connection_id)
    }

    pub fn connection_ids(&self) -> [String; 2] {
        [
            self.players[0].connection_id.clone(),
            self.players[1].connection_id.clone(),
        ]
    }

    pub fn scores(&self) -> HashMap<String, u32> {
        self.players
            .iter()
            .map(|p| (p.player_id.clone(), p.score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_forming_at_round_zero() {
        let session = GameSession::new("conn-1", "conn-2");

        assert!(!session.session_id.is_empty());
        assert_eq!(session.round, 0);
        assert!(session.current_round.is_none());
        assert_eq!(session.status, SessionStatus::Forming);
        assert_eq!(session.players[0].connection_id, "conn-1");
        assert_eq!(session.players[1].connection_id, "conn-2");
    }

    #[test]
    fn test_players_start_at_zero_score_not_ready() {
        let session = GameSession::new("conn-1", "conn-2");

        for player in &session.players {
            assert_eq!(player.score, 0);
            assert!(!player.ready);
        }
    }

    #[test]
    fn test_player_ids_are_distinct_and_not_connection_ids() {
        let session = GameSession::new("conn-1", "conn-2");

        assert_ne!(session.players[0].player_id, session.players[1].player_id);
        assert_ne!(session.players[0].player_id, "conn-1");
        assert_ne!(session.players[1].player_id, "conn-2");
    }

    #[test]
    fn test_session_id_uniqueness() {
        let session_1 = GameSession::new("conn-1", "conn-2");
        let session_2 = GameSession::new("conn-1", "conn-2");

        assert_ne!(session_1.session_id, session_2.session_id);
    }

    #[test]
    fn test_opponent_lookup_by_connection() {
        let session = GameSession::new("conn-1", "conn-2");

        let opponent = session.opponent_of_connection("conn-1").unwrap();
        assert_eq!(opponent.connection_id, "conn-2");

        let opponent = session.opponent_of_connection("conn-2").unwrap();
        assert_eq!(opponent.connection_id, "conn-1");
    }

    #[test]
    fn test_scores_map_covers_both_players() {
        let mut session = GameSession::new("conn-1", "conn-2");
        session.players[0].score = 3;
        session.players[1].score = 1;

        let scores = session.scores();

        assert_eq!(scores.len(), 2);
        assert_eq!(scores[&session.players[0].player_id], 3);
        assert_eq!(scores[&session.players[1].player_id], 1);
    }

    #[test]
    fn test_serialization_round_trip() {
        let session = GameSession::new("conn-1", "conn-2");

        let serialized = serde_json::to_string(&session).unwrap();
        let deserialized: GameSession = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.session_id, session.session_id);
        assert_eq!(deserialized.players[0].player_id, session.players[0].player_id);
        assert_eq!(deserialized.status, SessionStatus::Forming);
    }
}
