//! Wire protocol between clients and the game server.
//!
//! Both directions are closed tagged enums; anything that does not parse into
//! a variant is dropped by the connection handler rather than interpreted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Answer submission for the current round.
    Answer {
        game_id: String,
        player_id: String,
        question_id: u32,
        answer: String,
    },

    /// The player wants to skip ahead to the next round.
    Ready { game_id: String, player_id: String },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// No opponent yet; the connection is parked in the waiting slot.
    Waiting { message: String },

    /// A match was formed. Tells the client its session and player identity.
    GameStart {
        game_id: String,
        player_id: String,
        message: String,
    },

    /// A new round. The correct answer is never included.
    Question {
        round: u32,
        question: String,
        question_id: u32,
        time_limit: u64,
    },

    /// Outcome of the receiving player's own submission.
    AnswerResult { correct: bool, message: String },

    /// The opponent answered correctly.
    OpponentAnswer { correct: bool, message: String },

    /// Both players' scores keyed by player id.
    ScoreUpdate { scores: HashMap<String, u32> },

    RoundOver { message: String },

    OpponentLeft { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_message_deserialization() {
        let json = r#"{
            "type": "answer",
            "game_id": "game-1",
            "player_id": "player-1",
            "question_id": 2,
            "answer": "Paris"
        }"#;

        let message: ClientMessage = serde_json::from_str(json).unwrap();

        match message {
            ClientMessage::Answer {
                game_id,
                player_id,
                question_id,
                answer,
            } => {
                assert_eq!(game_id, "game-1");
                assert_eq!(player_id, "player-1");
                assert_eq!(question_id, 2);
                assert_eq!(answer, "Paris");
            }
            other => panic!("expected answer message, got {:?}", other),
        }
    }

    #[test]
    fn test_ready_message_deserialization() {
        let json = r#"{"type": "ready", "game_id": "game-1", "player_id": "player-1"}"#;

        let message: ClientMessage = serde_json::from_str(json).unwrap();

        assert!(matches!(message, ClientMessage::Ready { .. }));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"type": "resign", "game_id": "game-1"}"#;

        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"type": "answer", "game_id": "game-1", "player_id": "player-1"}"#;

        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_question_serialization_tags() {
        let message = ServerMessage::Question {
            round: 1,
            question: "What is the capital of France?".to_string(),
            question_id: 2,
            time_limit: 30,
        };

        let json = serde_json::to_string(&message).unwrap();

        assert!(json.contains("\"type\":\"question\""));
        assert!(json.contains("\"round\":1"));
        assert!(json.contains("\"time_limit\":30"));
        assert!(!json.contains("answer"));
    }

    #[test]
    fn test_game_start_serialization_tags() {
        let message = ServerMessage::GameStart {
            game_id: "game-1".to_string(),
            player_id: "player-1".to_string(),
            message: "Game starting! You are Player 1.".to_string(),
        };

        let json = serde_json::to_string(&message).unwrap();

        assert!(json.contains("\"type\":\"game_start\""));
        assert!(json.contains("\"game_id\":\"game-1\""));
    }

    #[test]
    fn test_score_update_serialization() {
        let mut scores = HashMap::new();
        scores.insert("player-1".to_string(), 2);

        let json = serde_json::to_string(&ServerMessage::ScoreUpdate { scores }).unwrap();

        assert!(json.contains("\"type\":\"score_update\""));
        assert!(json.contains("\"player-1\":2"));
    }
}
