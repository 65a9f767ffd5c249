use async_trait::async_trait;
use uuid::Uuid;

use super::types::{Question, Quiz, QuizAttempt};
use crate::store::RepositoryError;

#[async_trait]
pub trait QuizzesRepository: Send + Sync {
    /// Stores a new quiz.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Duplicate` if the module already has a quiz.
    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), RepositoryError>;

    async fn quiz(&self, quiz_id: &Uuid) -> Result<Option<Quiz>, RepositoryError>;

    async fn quiz_for_module(&self, module_id: &Uuid) -> Result<Option<Quiz>, RepositoryError>;

    async fn insert_question(&self, question: &Question) -> Result<(), RepositoryError>;

    /// Questions of a quiz, in the order they were added.
    async fn questions(&self, quiz_id: &Uuid) -> Result<Vec<Question>, RepositoryError>;
}

/// Attempts are append-only. Nothing is overwritten; a newer attempt only supersedes older ones
/// when looking for the latest.
#[async_trait]
pub trait AttemptsRepository: Send + Sync {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<(), RepositoryError>;

    /// The attempt with the greatest `attempted_at`. Ties are broken consistently, but the order is
    /// up to the backend.
    async fn latest_attempt(&self, user_id: &Uuid, quiz_id: &Uuid) -> Result<Option<QuizAttempt>, RepositoryError>;

    /// Attempts of a user on a quiz, oldest first.
    async fn attempts(&self, user_id: &Uuid, quiz_id: &Uuid) -> Result<Vec<QuizAttempt>, RepositoryError>;

    /// Attempts of every user on a quiz, in no particular order.
    async fn attempts_for_quiz(&self, quiz_id: &Uuid) -> Result<Vec<QuizAttempt>, RepositoryError>;
}
