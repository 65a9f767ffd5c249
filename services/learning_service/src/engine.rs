use std::sync::Arc;

use crate::analytics::CourseReporter;
use crate::certification::CertificationEvaluator;
use crate::enrollment::EnrollmentGate;
use crate::progress::ProgressTracker;
use crate::quiz::QuizEngine;
use crate::store::Store;

/// Entry point to the components, all sharing one store. Cheap to clone.
pub struct LearningEngine<S> {
    store: Arc<S>,
}

impl<S: Store> LearningEngine<S> {
    pub fn new(store: S) -> Self {
        LearningEngine { store: Arc::new(store) }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gate(&self) -> EnrollmentGate<'_, S> {
        EnrollmentGate::new(self.store())
    }

    pub fn tracker(&self) -> ProgressTracker<'_, S> {
        ProgressTracker::new(self.store())
    }

    pub fn quizzes(&self) -> QuizEngine<'_, S> {
        QuizEngine::new(self.store())
    }

    pub fn certification(&self) -> CertificationEvaluator<'_, S> {
        CertificationEvaluator::new(self.store())
    }

    pub fn reporter(&self) -> CourseReporter<'_, S> {
        CourseReporter::new(self.store())
    }
}

impl<S> Clone for LearningEngine<S> {
    fn clone(&self) -> Self {
        LearningEngine {
            store: Arc::clone(&self.store),
        }
    }
}
