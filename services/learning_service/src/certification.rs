//! Certificate eligibility: the one place that decides whether a learner finished a course.

use uuid::Uuid;

use crate::catalog::course_outline;
use crate::error::{Entity, EngineError};
use crate::progress::{Progress, ProgressTracker};
use crate::quiz::QuizEngine;
use crate::request_context::RequestContext;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityReport {
    pub eligible: bool,
    pub progress: Progress,
    /// Quizzes of the course the learner never attempted.
    pub pending_quiz_ids: Vec<Uuid>,
    /// Quizzes whose latest attempt failed.
    pub failed_quiz_ids: Vec<Uuid>,
}

/// Computes eligibility from current completions and attempts. Never writes.
pub struct CertificationEvaluator<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> CertificationEvaluator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        CertificationEvaluator { store }
    }

    /// A course is earned when every lesson is complete and the latest attempt on every module
    /// quiz passed.
    pub async fn compute_eligibility(&self, ctx: &RequestContext, course_id: &Uuid) -> Result<bool, EngineError> {
        Ok(self.explain_eligibility(ctx, course_id).await?.eligible)
    }

    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn explain_eligibility(
        &self,
        ctx: &RequestContext,
        course_id: &Uuid,
    ) -> Result<EligibilityReport, EngineError> {
        let outline = course_outline(self.store, course_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Course, *course_id))?;
        let progress = ProgressTracker::new(self.store)
            .outline_progress(&ctx.user_id, &outline)
            .await?;

        let quizzes = QuizEngine::new(self.store);
        let mut pending_quiz_ids = Vec::new();
        let mut failed_quiz_ids = Vec::new();
        for module in &outline.modules {
            let quiz = match self.store.quiz_for_module(&module.module.module_id).await? {
                Some(quiz) => quiz,
                None => continue,
            };
            match quizzes.latest_attempt_for(&ctx.user_id, &quiz.quiz_id).await? {
                None => pending_quiz_ids.push(quiz.quiz_id),
                Some(attempt) if !attempt.passed => failed_quiz_ids.push(quiz.quiz_id),
                Some(_) => {}
            }
        }

        // 199 of 200 lessons rounds to 100%, so completeness is checked on the counts as well.
        let eligible =
            progress.percent == 100 && progress.complete && pending_quiz_ids.is_empty() && failed_quiz_ids.is_empty();
        tracing::debug!(eligible, percent = progress.percent, "Eligibility computed.");

        Ok(EligibilityReport {
            eligible,
            progress,
            pending_quiz_ids,
            failed_quiz_ids,
        })
    }
}
