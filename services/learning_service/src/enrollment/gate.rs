use uuid::Uuid;

use super::repository::EnrollmentsRepository;
use super::types::Enrollment;
use crate::catalog::CatalogRepository;
use crate::error::{Entity, EngineError};
use crate::request_context::RequestContext;
use crate::store::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollOutcome {
    pub enrollment: Enrollment,
    /// False when the user was already enrolled.
    pub created: bool,
}

/// Decides whether a user may use a course, and enrolls users.
pub struct EnrollmentGate<'a, S> {
    store: &'a S,
}

impl<'a, S> EnrollmentGate<'a, S>
where
    S: CatalogRepository + EnrollmentsRepository,
{
    pub fn new(store: &'a S) -> Self {
        EnrollmentGate { store }
    }

    /// Enrolls the caller in a course. Enrolling twice returns the original enrollment, with its
    /// original timestamp.
    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn enroll(&self, ctx: &RequestContext, course_id: &Uuid) -> Result<EnrollOutcome, EngineError> {
        if self.store.course(course_id).await?.is_none() {
            return Err(EngineError::NotFound(Entity::Course, *course_id));
        }

        let enrollment = Enrollment::new(ctx.user_id, *course_id, chrono::offset::Utc::now());
        match self.store.insert_enrollment(&enrollment).await {
            Ok(()) => {
                tracing::info!("User enrolled.");
                Ok(EnrollOutcome {
                    enrollment,
                    created: true,
                })
            }
            Err(RepositoryError::Duplicate(_)) => {
                let existing = self
                    .store
                    .enrollment(&ctx.user_id, course_id)
                    .await?
                    .ok_or_else(|| EngineError::Conflict(format!("enrollment in course {}", course_id)))?;
                tracing::debug!("User already enrolled.");
                Ok(EnrollOutcome {
                    enrollment: existing,
                    created: false,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the caller may use the course. Has no side effects.
    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn check_access(&self, ctx: &RequestContext, course_id: &Uuid) -> Result<Access, EngineError> {
        if self.store.course(course_id).await?.is_none() {
            return Err(EngineError::NotFound(Entity::Course, *course_id));
        }

        self.access(ctx, course_id).await
    }

    /// Fails with `AccessDenied` unless the caller is enrolled in the course. The course is
    /// assumed to exist.
    pub async fn require_access(&self, ctx: &RequestContext, course_id: &Uuid) -> Result<(), EngineError> {
        match self.access(ctx, course_id).await? {
            Access::Unlocked => Ok(()),
            Access::Locked => {
                tracing::debug!(%course_id, user_id = %ctx.user_id, "Access denied: not enrolled.");
                Err(EngineError::not_enrolled(course_id))
            }
        }
    }

    pub async fn enrollments(&self, ctx: &RequestContext) -> Result<Vec<Enrollment>, EngineError> {
        Ok(self.store.enrollments_for_user(&ctx.user_id).await?)
    }

    async fn access(&self, ctx: &RequestContext, course_id: &Uuid) -> Result<Access, EngineError> {
        let enrollment = self.store.enrollment(&ctx.user_id, course_id).await?;
        Ok(if enrollment.is_some() {
            Access::Unlocked
        } else {
            Access::Locked
        })
    }
}
