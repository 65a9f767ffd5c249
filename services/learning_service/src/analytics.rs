//! Course-level counts for administrators.

use uuid::Uuid;

use crate::catalog::CatalogRepository;
use crate::enrollment::EnrollmentsRepository;
use crate::error::{Entity, EngineError};
use crate::quiz::QuizzesRepository;
use crate::request_context::RequestContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseAnalytics {
    pub enrollment_count: u32,
    pub module_count: u32,
    /// Modules of the course that have a quiz.
    pub quiz_count: u32,
}

pub struct CourseReporter<'a, S> {
    store: &'a S,
}

impl<'a, S> CourseReporter<'a, S>
where
    S: CatalogRepository + EnrollmentsRepository + QuizzesRepository,
{
    pub fn new(store: &'a S) -> Self {
        CourseReporter { store }
    }

    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn course_analytics(&self, ctx: &RequestContext, course_id: &Uuid) -> Result<CourseAnalytics, EngineError> {
        ctx.require_admin()?;
        if self.store.course(course_id).await?.is_none() {
            return Err(EngineError::NotFound(Entity::Course, *course_id));
        }

        let enrollments = self.store.enrollments_for_course(course_id).await?;
        let modules = self.store.modules(course_id).await?;
        let mut quiz_count = 0;
        for module in &modules {
            if self.store.quiz_for_module(&module.module_id).await?.is_some() {
                quiz_count += 1;
            }
        }

        Ok(CourseAnalytics {
            enrollment_count: enrollments.len() as u32,
            module_count: modules.len() as u32,
            quiz_count,
        })
    }
}
