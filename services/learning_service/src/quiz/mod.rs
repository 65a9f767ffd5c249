//! Module quizzes: authoring of questions, scoring of attempts and attempt history.

pub mod engine;
pub mod repository;
pub mod scoring;
pub mod stats;
pub mod types;

pub use engine::{LearnerQuestion, LearnerQuiz, QuizEngine, QuizTarget};
pub use repository::{AttemptsRepository, QuizzesRepository};
pub use stats::{LearnerScore, QuizStats};
pub use types::{AttemptResult, NewQuestion, NewQuiz, OptionLabel, Question, Quiz, QuizAttempt};
