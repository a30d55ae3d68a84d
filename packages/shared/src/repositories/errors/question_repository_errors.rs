#[derive(Debug)]
pub enum QuestionRepositoryError {
    EmptyBank,
    Io(String),
    Parse(String),
}

impl std::fmt::Display for QuestionRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionRepositoryError::EmptyBank => write!(f, "Question bank is empty"),
            QuestionRepositoryError::Io(msg) => write!(f, "Failed to read question file: {}", msg),
            QuestionRepositoryError::Parse(msg) => {
                write!(f, "Failed to parse question file: {}", msg)
            }
        }
    }
}

impl std::error::Error for QuestionRepositoryError {}
