pub mod question_repository_errors;
