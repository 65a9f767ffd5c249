use async_trait::async_trait;
use uuid::Uuid;

use super::types::LessonCompletion;
use crate::store::RepositoryError;

#[async_trait]
pub trait CompletionsRepository: Send + Sync {
    /// Stores a new completion.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Duplicate` if the user already completed the lesson.
    async fn insert_completion(&self, completion: &LessonCompletion) -> Result<(), RepositoryError>;

    async fn completion(&self, user_id: &Uuid, lesson_id: &Uuid) -> Result<Option<LessonCompletion>, RepositoryError>;

    /// Every completion of a user within a course, in no particular order.
    async fn completions_for_course(
        &self,
        user_id: &Uuid,
        course_id: &Uuid,
    ) -> Result<Vec<LessonCompletion>, RepositoryError>;
}
