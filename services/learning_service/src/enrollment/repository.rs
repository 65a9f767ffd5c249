use async_trait::async_trait;
use uuid::Uuid;

use super::types::Enrollment;
use crate::store::RepositoryError;

#[async_trait]
pub trait EnrollmentsRepository: Send + Sync {
    /// Stores a new enrollment.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Duplicate` if the user is already enrolled in the course.
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), RepositoryError>;

    async fn enrollment(&self, user_id: &Uuid, course_id: &Uuid) -> Result<Option<Enrollment>, RepositoryError>;

    /// Enrollments of a user, oldest first.
    async fn enrollments_for_user(&self, user_id: &Uuid) -> Result<Vec<Enrollment>, RepositoryError>;

    /// Every enrollment in a course, oldest first.
    async fn enrollments_for_course(&self, course_id: &Uuid) -> Result<Vec<Enrollment>, RepositoryError>;
}
