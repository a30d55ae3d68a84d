use std::time::Duration;

/// Runtime configuration, read once from the environment at startup. Every
/// setting has a default so the server runs with no environment at all.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub inter_round_delay_secs: u64,
    pub questions_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("QUIZ_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let inter_round_delay_secs = std::env::var("QUIZ_INTER_ROUND_DELAY_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(2);
        let questions_file = std::env::var("QUIZ_QUESTIONS_FILE").ok();

        Config {
            bind_addr,
            inter_round_delay_secs,
            questions_file,
        }
    }

    pub fn inter_round_delay(&self) -> Duration {
        Duration::from_secs(self.inter_round_delay_secs)
    }
}
