use std::path::Path;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::info;

use crate::models::question::Question;
use crate::repositories::errors::question_repository_errors::QuestionRepositoryError;

/// Source of quiz questions. The core requests one record per round and owns
/// no question state itself.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn fetch_random(&self) -> Result<Question, QuestionRepositoryError>;
}

pub struct InMemoryQuestionRepository {
    questions: Vec<Question>,
}

impl InMemoryQuestionRepository {
    /// Built-in question bank used when no external file is configured.
    pub fn with_sample_questions() -> Self {
        let questions = vec![
            Question::new(1, "What is 2 + 2?", "4"),
            Question::new(2, "What is the capital of France?", "Paris"),
            Question::new(3, "How many planets are in our solar system?", "8"),
            Question::new(4, "What is 7 * 8?", "56"),
            Question::new(5, "What is the largest ocean on Earth?", "Pacific"),
            Question::new(6, "What is the square root of 64?", "8"),
            Question::new(7, "What is the chemical symbol for gold?", "Au"),
            Question::new(8, "What is the first element on the periodic table?", "Hydrogen"),
            Question::new(9, "Who wrote 'Romeo and Juliet'?", "Shakespeare"),
            Question::new(10, "What is the smallest prime number?", "2"),
        ];
        info!("Loaded {} sample questions", questions.len());
        Self { questions }
    }

    pub fn from_questions(questions: Vec<Question>) -> Result<Self, QuestionRepositoryError> {
        if questions.is_empty() {
            return Err(QuestionRepositoryError::EmptyBank);
        }
        Ok(Self { questions })
    }

    /// Load a question bank from a JSON file containing an array of question
    /// records. Records may omit `time_limit_secs`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, QuestionRepositoryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| QuestionRepositoryError::Io(e.to_string()))?;
        let questions: Vec<Question> = serde_json::from_str(&contents)
            .map_err(|e| QuestionRepositoryError::Parse(e.to_string()))?;

        info!("Loaded {} questions from {}", questions.len(), path.display());
        Self::from_questions(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn fetch_random(&self) -> Result<Question, QuestionRepositoryError> {
        self.questions
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(QuestionRepositoryError::EmptyBank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_bank_serves_questions() {
        let repository = InMemoryQuestionRepository::with_sample_questions();

        assert_eq!(repository.len(), 10);

        let question = repository.fetch_random().await.unwrap();
        assert!(!question.question.is_empty());
        assert!(!question.answer.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_random_returns_bank_member() {
        let bank = vec![Question::new(1, "What is 2 + 2?", "4")];
        let repository = InMemoryQuestionRepository::from_questions(bank).unwrap();

        let question = repository.fetch_random().await.unwrap();

        assert_eq!(question.id, 1);
        assert_eq!(question.answer, "4");
    }

    #[test]
    fn test_empty_bank_is_rejected() {
        let result = InMemoryQuestionRepository::from_questions(vec![]);

        assert!(matches!(result, Err(QuestionRepositoryError::EmptyBank)));
    }

    #[test]
    fn test_from_json_file_loads_and_defaults_time_limit() {
        let path = std::env::temp_dir().join(format!(
            "questions-{}.json",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(
            &path,
            r#"[
                {"id": 1, "question": "What is 2 + 2?", "answer": "4"},
                {"id": 2, "question": "What is the capital of France?", "answer": "Paris", "time_limit_secs": 20}
            ]"#,
        )
        .unwrap();

        let repository = InMemoryQuestionRepository::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(repository.len(), 2);
    }

    #[test]
    fn test_from_json_file_missing_file_is_io_error() {
        let result = InMemoryQuestionRepository::from_json_file("/nonexistent/questions.json");

        assert!(matches!(result, Err(QuestionRepositoryError::Io(_))));
    }

    #[test]
    fn test_from_json_file_invalid_json_is_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "questions-{}.json",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, "not json").unwrap();

        let result = InMemoryQuestionRepository::from_json_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(QuestionRepositoryError::Parse(_))));
    }
}
