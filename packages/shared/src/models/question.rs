use serde::{Deserialize, Serialize};

/// Time limit applied when a question record does not carry its own.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 30;

fn default_time_limit() -> u64 {
    DEFAULT_TIME_LIMIT_SECS
}

/// A quiz question as supplied by the question source. The `answer` field is
/// server-side only and must never be sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub answer: String,
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u64,
}

impl Question {
    pub fn new(id: u32, question: &str, answer: &str) -> Self {
        Question {
            id,
            question: question.to_string(),
            answer: answer.to_string(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
        }
    }
}
