use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::models::game_session::{GameSession, Round, SessionStatus};
use crate::models::message::ServerMessage;
use crate::repositories::question_repository::QuestionRepository;
use crate::repositories::session_registry::SessionRegistry;
use crate::services::notification_service::NotificationService;

/// Pause between a round ending and the next question going out.
pub const DEFAULT_INTER_ROUND_DELAY: Duration = Duration::from_secs(2);

/// Case-insensitive, leading/trailing-whitespace-insensitive equality.
pub fn answers_match(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}

struct RoundDispatch {
    round: u32,
    question_id: u32,
    question: String,
    time_limit_secs: u64,
    connections: [String; 2],
}

enum AnswerOutcome {
    /// Protocol error (unknown session or player). Dropped without a reply.
    Ignored,
    /// No live round to score against; the comparison is informational only.
    AlreadyComplete {
        submitter_connection: String,
        correct: bool,
    },
    Incorrect {
        submitter_connection: String,
    },
    Correct {
        submitter_connection: String,
        opponent_connection: String,
        scores: HashMap<String, u32>,
        round: u32,
    },
}

/// Drives a session through its round lifecycle: question dispatch, answer
/// arbitration, scoring, ready synchronization, timeout, and teardown.
///
/// Every state mutation runs inside a registry lock section that computes an
/// outcome; notifications go out only after the lock is released. Timer tasks
/// re-validate the round counter and resolved flag under the lock, so a stale
/// timer can never touch a later round.
#[derive(Clone)]
pub struct GameSessionService {
    registry: Arc<SessionRegistry>,
    questions: Arc<dyn QuestionRepository>,
    notifier: Arc<NotificationService>,
    inter_round_delay: Duration,
}

impl GameSessionService {
    pub fn new(
        registry: Arc<SessionRegistry>,
        questions: Arc<dyn QuestionRepository>,
        notifier: Arc<NotificationService>,
        inter_round_delay: Duration,
    ) -> Self {
        GameSessionService {
            registry,
            questions,
            notifier,
            inter_round_delay,
        }
    }

    /// Announce a freshly formed session to both players and dispatch the
    /// first round.
    pub async fn begin_match(&self, session: &GameSession) {
        for (slot, player) in session.players.iter().enumerate() {
            let message = ServerMessage::GameStart {
                game_id: session.session_id.clone(),
                player_id: player.player_id.clone(),
                message: format!("Game starting! You are Player {}.", slot + 1),
            };
            self.deliver(&player.connection_id, message).await;
        }
        self.start_round(&session.session_id, 0).await;
    }

    /// Dispatch the next round, but only if the session's round counter still
    /// equals `after_round`. Every advancement path (correct answer, both
    /// ready, timeout) passes the counter it observed, so racing paths cannot
    /// start the same round twice.
    pub async fn start_round(&self, session_id: &str, after_round: u32) {
        let question = match self.questions.fetch_random().await {
            Ok(question) => question,
            Err(e) => {
                warn!("Question source failed for session {}: {}", session_id, e);
                return;
            }
        };

        let dispatch = self
            .registry
            .with_session_mut(session_id, |session| {
                if session.round != after_round {
                    return None;
                }
                session.status = SessionStatus::Active;
                session.round += 1;
                for player in session.players.iter_mut() {
                    player.ready = false;
                }
                session.current_round = Some(Round {
                    question_id: question.id,
                    question: question.question.clone(),
                    answer: question.answer.clone(),
                    time_limit_secs: question.time_limit_secs,
                    resolved: false,
                });
                Some(RoundDispatch {
                    round: session.round,
                    question_id: question.id,
                    question: question.question.clone(),
                    time_limit_secs: question.time_limit_secs,
                    connections: session.connection_ids(),
                })
            })
            .flatten();

        let Some(dispatch) = dispatch else { return };
        info!("Session {} round {} started", session_id, dispatch.round);

        for connection_id in &dispatch.connections {
            self.deliver(
                connection_id,
                ServerMessage::Question {
                    round: dispatch.round,
                    question: dispatch.question.clone(),
                    question_id: dispatch.question_id,
                    time_limit: dispatch.time_limit_secs,
                },
            )
            .await;
        }

        // Arm the server-side round timer.
        let service = self.clone();
        let session_id = session_id.to_string();
        let round = dispatch.round;
        let limit = Duration::from_secs(dispatch.time_limit_secs);
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            service.expire_round(&session_id, round).await;
        });
    }

    /// Arbitrate an answer submission. The resolved-flag check and flip stay
    /// inside one lock section: of two near-simultaneous correct submissions,
    /// only the first to execute it scores.
    pub async fn handle_answer(
        &self,
        session_id: &str,
        player_id: &str,
        question_id: u32,
        answer: &str,
    ) {
        let outcome = self
            .registry
            .with_session_mut(session_id, |session| {
                let Some(index) = session.player_index_by_id(player_id) else {
                    return AnswerOutcome::Ignored;
                };
                let submitter_connection = session.players[index].connection_id.clone();

                let (correct, live) = match session.current_round.as_ref() {
                    None => (false, false),
                    Some(round) => (
                        answers_match(answer, &round.answer),
                        !round.resolved && round.question_id == question_id,
                    ),
                };

                if !live {
                    return AnswerOutcome::AlreadyComplete {
                        submitter_connection,
                        correct,
                    };
                }
                if !correct {
                    return AnswerOutcome::Incorrect {
                        submitter_connection,
                    };
                }

                if let Some(round) = session.current_round.as_mut() {
                    round.resolved = true;
                }
                session.players[index].score += 1;
                AnswerOutcome::Correct {
                    submitter_connection,
                    opponent_connection: session.players[1 - index].connection_id.clone(),
                    scores: session.scores(),
                    round: session.round,
                }
            })
            .unwrap_or(AnswerOutcome::Ignored);

        match outcome {
            AnswerOutcome::Ignored => {
                debug!(
                    "Ignoring answer from {} for unknown session {}",
                    player_id, session_id
                );
            }
            AnswerOutcome::AlreadyComplete {
                submitter_connection,
                correct,
            } => {
                self.deliver(
                    &submitter_connection,
                    ServerMessage::AnswerResult {
                        correct,
                        message: "Round already complete.".to_string(),
                    },
                )
                .await;
            }
            AnswerOutcome::Incorrect {
                submitter_connection,
            } => {
                self.deliver(
                    &submitter_connection,
                    ServerMessage::AnswerResult {
                        correct: false,
                        message: "Incorrect answer. Try again!".to_string(),
                    },
                )
                .await;
            }
            AnswerOutcome::Correct {
                submitter_connection,
                opponent_connection,
                scores,
                round,
            } => {
                info!("Session {} round {} won by {}", session_id, round, player_id);
                self.deliver(
                    &submitter_connection,
                    ServerMessage::AnswerResult {
                        correct: true,
                        message: "Correct answer!".to_string(),
                    },
                )
                .await;
                self.deliver(
                    &opponent_connection,
                    ServerMessage::OpponentAnswer {
                        correct: true,
                        message: "Your opponent answered correctly!".to_string(),
                    },
                )
                .await;
                for connection_id in [&submitter_connection, &opponent_connection] {
                    self.deliver(
                        connection_id,
                        ServerMessage::ScoreUpdate {
                            scores: scores.clone(),
                        },
                    )
                    .await;
                }
                for connection_id in [&submitter_connection, &opponent_connection] {
                    self.deliver(
                        connection_id,
                        ServerMessage::RoundOver {
                            message: "Round over! Next question coming up...".to_string(),
                        },
                    )
                    .await;
                }
                self.schedule_next_round(session_id, round);
            }
        }
    }

    /// The non-scoring skip path: once both players are ready and the current
    /// round is still unresolved (or no round exists yet), advance. A resolved
    /// round is already owned by the pending auto-advance task.
    pub async fn handle_ready(&self, session_id: &str, player_id: &str) {
        let advance = self
            .registry
            .with_session_mut(session_id, |session| {
                let index = session.player_index_by_id(player_id)?;
                session.players[index].ready = true;

                let both_ready = session.players.iter().all(|p| p.ready);
                let skippable = match session.current_round.as_ref() {
                    None => true,
                    Some(round) => !round.resolved,
                };
                if !(both_ready && skippable) {
                    return None;
                }
                if let Some(round) = session.current_round.as_mut() {
                    round.resolved = true;
                }
                Some(session.round)
            })
            .flatten();

        if let Some(round) = advance {
            debug!("Both players ready in session {}, advancing", session_id);
            self.start_round(session_id, round).await;
        }
    }

    /// Tear the session down and tell the surviving player. Safe to call for
    /// connections that were never matched or whose session is already gone.
    pub async fn handle_disconnect(&self, connection_id: &str) {
        let Some(session_id) = self.registry.session_of(connection_id) else {
            return;
        };
        let Some(session) = self.registry.terminate(&session_id) else {
            return;
        };

        info!("Connection {} left session {}", connection_id, session_id);
        if let Some(opponent) = session.opponent_of_connection(connection_id) {
            let message = ServerMessage::OpponentLeft {
                message: "Your opponent has left the game.".to_string(),
            };
            if let Err(e) = self.notifier.send(&opponent.connection_id, message).await {
                debug!(
                    "Opponent {} already unreachable: {}",
                    opponent.connection_id, e
                );
            }
        }
    }

    /// Resolve a round nobody answered in time. A stale timer (the session
    /// advanced or ended) is a no-op.
    async fn expire_round(&self, session_id: &str, round: u32) {
        let connections = self
            .registry
            .with_session_mut(session_id, |session| {
                if session.round != round {
                    return None;
                }
                let resolved_now = match session.current_round.as_mut() {
                    Some(current) if !current.resolved => {
                        current.resolved = true;
                        true
                    }
                    _ => false,
                };
                if resolved_now {
                    Some(session.connection_ids())
                } else {
                    None
                }
            })
            .flatten();

        let Some(connections) = connections else { return };
        info!("Session {} round {} timed out", session_id, round);

        for connection_id in &connections {
            self.deliver(
                connection_id,
                ServerMessage::RoundOver {
                    message: "Time's up! Next question coming up...".to_string(),
                },
            )
            .await;
        }
        self.schedule_next_round(session_id, round);
    }

    fn schedule_next_round(&self, session_id: &str, completed_round: u32) {
        let service = self.clone();
        let session_id = session_id.to_string();
        let delay = self.inter_round_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            service.start_round(&session_id, completed_round).await;
        });
    }

    /// Best-effort delivery; a dead channel means the target disconnected,
    /// which tears its session down.
    async fn deliver(&self, connection_id: &str, message: ServerMessage) {
        if let Err(e) = self.notifier.send(connection_id, message).await {
            warn!("Delivery failed, treating as disconnect: {}", e);
            self.handle_disconnect(connection_id).await;
        }
    }
}
