use std::collections::HashSet;

use uuid::Uuid;

use super::repository::CompletionsRepository;
use super::types::{LessonCompletion, Progress};
use crate::catalog::{course_outline, CatalogRepository, CourseOutline};
use crate::enrollment::{EnrollmentGate, EnrollmentsRepository};
use crate::error::{Entity, EngineError};
use crate::request_context::RequestContext;
use crate::store::RepositoryError;

/// Records lesson completions and aggregates them into module and course progress.
pub struct ProgressTracker<'a, S> {
    store: &'a S,
}

impl<'a, S> ProgressTracker<'a, S>
where
    S: CatalogRepository + EnrollmentsRepository + CompletionsRepository,
{
    pub fn new(store: &'a S) -> Self {
        ProgressTracker { store }
    }

    /// Marks a lesson as done for the caller. Marking a lesson twice returns the first completion
    /// unchanged, so retries never add to the watched time or the completed count.
    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn mark_lesson_complete(
        &self,
        ctx: &RequestContext,
        lesson_id: &Uuid,
        watched_seconds: u32,
    ) -> Result<LessonCompletion, EngineError> {
        let lesson = self
            .store
            .lesson(lesson_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Lesson, *lesson_id))?;
        EnrollmentGate::new(self.store)
            .require_access(ctx, &lesson.course_id)
            .await?;

        if let Some(existing) = self.store.completion(&ctx.user_id, lesson_id).await? {
            tracing::debug!("Lesson already completed.");
            return Ok(existing);
        }

        let completion = LessonCompletion::builder()
            .user_id(ctx.user_id)
            .lesson_id(lesson.lesson_id)
            .module_id(lesson.module_id)
            .course_id(lesson.course_id)
            .watched_seconds(watched_seconds)
            .build();

        match self.store.insert_completion(&completion).await {
            Ok(()) => {
                tracing::info!("Lesson completed.");
                Ok(completion)
            }
            // A concurrent call won the race; its row is the one that counts.
            Err(RepositoryError::Duplicate(_)) => self
                .store
                .completion(&ctx.user_id, lesson_id)
                .await?
                .ok_or_else(|| EngineError::Conflict(format!("completion of lesson {}", lesson_id))),
            Err(e) => Err(e.into()),
        }
    }

    /// Progress of the caller over every lesson of every module of the course.
    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn course_progress(&self, ctx: &RequestContext, course_id: &Uuid) -> Result<Progress, EngineError> {
        let outline = course_outline(self.store, course_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Course, *course_id))?;

        self.outline_progress(&ctx.user_id, &outline).await
    }

    /// Progress of a user over an already resolved course outline.
    pub async fn outline_progress(&self, user_id: &Uuid, outline: &CourseOutline) -> Result<Progress, EngineError> {
        let completed = self.completed_set(user_id, &outline.course.course_id).await?;
        let done = outline.lesson_ids().filter(|id| completed.contains(id)).count();

        Ok(Progress::from_counts(done as u32, outline.lesson_count() as u32))
    }

    /// Progress of the caller over the lessons of one module.
    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn module_progress(&self, ctx: &RequestContext, module_id: &Uuid) -> Result<Progress, EngineError> {
        let completed_ids = self.completed_lessons(ctx, module_id).await?;
        let total = self.store.lessons(module_id).await?.len();

        Ok(Progress::from_counts(completed_ids.len() as u32, total as u32))
    }

    /// IDs of the lessons of a module the caller completed, in lesson order.
    pub async fn completed_lessons(&self, ctx: &RequestContext, module_id: &Uuid) -> Result<Vec<Uuid>, EngineError> {
        let module = self
            .store
            .module(module_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Module, *module_id))?;
        let completed = self.completed_set(&ctx.user_id, &module.course_id).await?;

        Ok(self
            .store
            .lessons(module_id)
            .await?
            .into_iter()
            .map(|l| l.lesson_id)
            .filter(|id| completed.contains(id))
            .collect())
    }

    async fn completed_set(&self, user_id: &Uuid, course_id: &Uuid) -> Result<HashSet<Uuid>, RepositoryError> {
        Ok(self
            .store
            .completions_for_course(user_id, course_id)
            .await?
            .into_iter()
            .filter(|c| c.completed)
            .map(|c| c.lesson_id)
            .collect())
    }
}
