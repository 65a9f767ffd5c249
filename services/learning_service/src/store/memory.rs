use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RepositoryError;
use crate::catalog::{CatalogRepository, CatalogSeed, Course, Lesson, Module};
use crate::enrollment::{Enrollment, EnrollmentsRepository};
use crate::progress::{CompletionsRepository, LessonCompletion};
use crate::quiz::{AttemptsRepository, Question, Quiz, QuizAttempt, QuizzesRepository};

/// Keeps everything in process memory. Each uniqueness rule is the key of a map and every insert
/// checks and writes under the same write lock.
#[derive(Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
    enrollments: RwLock<BTreeMap<(Uuid, Uuid), Enrollment>>,
    completions: RwLock<BTreeMap<(Uuid, Uuid), LessonCompletion>>,
    quizzes: RwLock<Quizzes>,
    attempts: RwLock<HashMap<(Uuid, Uuid), Vec<QuizAttempt>>>,
}

#[derive(Default)]
struct Catalog {
    courses: HashMap<Uuid, Course>,
    /// Keyed by (course, order).
    modules: BTreeMap<(Uuid, u32), Module>,
    module_keys: HashMap<Uuid, (Uuid, u32)>,
    /// Keyed by (module, order).
    lessons: BTreeMap<(Uuid, u32), Lesson>,
    lesson_keys: HashMap<Uuid, (Uuid, u32)>,
}

#[derive(Default)]
struct Quizzes {
    /// Keyed by module.
    by_module: BTreeMap<Uuid, Quiz>,
    module_of: HashMap<Uuid, Uuid>,
    questions: HashMap<Uuid, Vec<Question>>,
}

impl MemoryStore {
    pub async fn from_seed(seed: CatalogSeed) -> Result<Self, RepositoryError> {
        let store = MemoryStore::default();
        let records = seed.into_records();
        for course in records.courses {
            store.insert_course(course).await?;
        }
        for module in records.modules {
            store.insert_module(module).await?;
        }
        for lesson in records.lessons {
            store.insert_lesson(lesson).await?;
        }

        Ok(store)
    }

    pub async fn insert_course(&self, course: Course) -> Result<(), RepositoryError> {
        let mut catalog = self.catalog.write().await;
        if catalog.courses.contains_key(&course.course_id) {
            return Err(RepositoryError::Duplicate("CourseId"));
        }

        catalog.courses.insert(course.course_id, course);
        Ok(())
    }

    pub async fn insert_module(&self, module: Module) -> Result<(), RepositoryError> {
        let mut catalog = self.catalog.write().await;
        if catalog.module_keys.contains_key(&module.module_id) {
            return Err(RepositoryError::Duplicate("ModuleId"));
        }

        let key = (module.course_id, module.order);
        let module_id = module.module_id;
        match catalog.modules.entry(key) {
            Entry::Occupied(_) => return Err(RepositoryError::Duplicate("CourseId, Order")),
            Entry::Vacant(slot) => {
                slot.insert(module);
            }
        }
        catalog.module_keys.insert(module_id, key);

        Ok(())
    }

    pub async fn insert_lesson(&self, lesson: Lesson) -> Result<(), RepositoryError> {
        let mut catalog = self.catalog.write().await;
        if catalog.lesson_keys.contains_key(&lesson.lesson_id) {
            return Err(RepositoryError::Duplicate("LessonId"));
        }

        let key = (lesson.module_id, lesson.order);
        let lesson_id = lesson.lesson_id;
        match catalog.lessons.entry(key) {
            Entry::Occupied(_) => return Err(RepositoryError::Duplicate("ModuleId, Order")),
            Entry::Vacant(slot) => {
                slot.insert(lesson);
            }
        }
        catalog.lesson_keys.insert(lesson_id, key);

        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn course(&self, course_id: &Uuid) -> Result<Option<Course>, RepositoryError> {
        Ok(self.catalog.read().await.courses.get(course_id).cloned())
    }

    async fn module(&self, module_id: &Uuid) -> Result<Option<Module>, RepositoryError> {
        let catalog = self.catalog.read().await;
        Ok(catalog
            .module_keys
            .get(module_id)
            .and_then(|key| catalog.modules.get(key))
            .cloned())
    }

    async fn lesson(&self, lesson_id: &Uuid) -> Result<Option<Lesson>, RepositoryError> {
        let catalog = self.catalog.read().await;
        Ok(catalog
            .lesson_keys
            .get(lesson_id)
            .and_then(|key| catalog.lessons.get(key))
            .cloned())
    }

    async fn modules(&self, course_id: &Uuid) -> Result<Vec<Module>, RepositoryError> {
        let catalog = self.catalog.read().await;
        Ok(catalog
            .modules
            .range((*course_id, u32::MIN)..=(*course_id, u32::MAX))
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn lessons(&self, module_id: &Uuid) -> Result<Vec<Lesson>, RepositoryError> {
        let catalog = self.catalog.read().await;
        Ok(catalog
            .lessons
            .range((*module_id, u32::MIN)..=(*module_id, u32::MAX))
            .map(|(_, l)| l.clone())
            .collect())
    }
}

#[async_trait]
impl EnrollmentsRepository for MemoryStore {
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<(), RepositoryError> {
        match self
            .enrollments
            .write()
            .await
            .entry((enrollment.user_id, enrollment.course_id))
        {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate("UserId, CourseId")),
            Entry::Vacant(slot) => {
                slot.insert(enrollment.clone());
                Ok(())
            }
        }
    }

    async fn enrollment(&self, user_id: &Uuid, course_id: &Uuid) -> Result<Option<Enrollment>, RepositoryError> {
        Ok(self.enrollments.read().await.get(&(*user_id, *course_id)).cloned())
    }

    async fn enrollments_for_user(&self, user_id: &Uuid) -> Result<Vec<Enrollment>, RepositoryError> {
        let mut enrollments: Vec<Enrollment> = self
            .enrollments
            .read()
            .await
            .range((*user_id, Uuid::nil())..=(*user_id, Uuid::from_u128(u128::MAX)))
            .map(|(_, e)| e.clone())
            .collect();
        enrollments.sort_by_key(|e| e.enrolled_at);

        Ok(enrollments)
    }

    async fn enrollments_for_course(&self, course_id: &Uuid) -> Result<Vec<Enrollment>, RepositoryError> {
        let mut enrollments: Vec<Enrollment> = self
            .enrollments
            .read()
            .await
            .values()
            .filter(|e| e.course_id == *course_id)
            .cloned()
            .collect();
        enrollments.sort_by_key(|e| e.enrolled_at);

        Ok(enrollments)
    }
}

#[async_trait]
impl CompletionsRepository for MemoryStore {
    async fn insert_completion(&self, completion: &LessonCompletion) -> Result<(), RepositoryError> {
        match self
            .completions
            .write()
            .await
            .entry((completion.user_id, completion.lesson_id))
        {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate("UserId, LessonId")),
            Entry::Vacant(slot) => {
                slot.insert(completion.clone());
                Ok(())
            }
        }
    }

    async fn completion(&self, user_id: &Uuid, lesson_id: &Uuid) -> Result<Option<LessonCompletion>, RepositoryError> {
        Ok(self.completions.read().await.get(&(*user_id, *lesson_id)).cloned())
    }

    async fn completions_for_course(
        &self,
        user_id: &Uuid,
        course_id: &Uuid,
    ) -> Result<Vec<LessonCompletion>, RepositoryError> {
        Ok(self
            .completions
            .read()
            .await
            .range((*user_id, Uuid::nil())..=(*user_id, Uuid::from_u128(u128::MAX)))
            .map(|(_, c)| c)
            .filter(|c| c.course_id == *course_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QuizzesRepository for MemoryStore {
    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), RepositoryError> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.module_of.contains_key(&quiz.quiz_id) {
            return Err(RepositoryError::Duplicate("QuizId"));
        }

        match quizzes.by_module.entry(quiz.module_id) {
            Entry::Occupied(_) => return Err(RepositoryError::Duplicate("ModuleId")),
            Entry::Vacant(slot) => {
                slot.insert(quiz.clone());
            }
        }
        quizzes.module_of.insert(quiz.quiz_id, quiz.module_id);

        Ok(())
    }

    async fn quiz(&self, quiz_id: &Uuid) -> Result<Option<Quiz>, RepositoryError> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes
            .module_of
            .get(quiz_id)
            .and_then(|module_id| quizzes.by_module.get(module_id))
            .cloned())
    }

    async fn quiz_for_module(&self, module_id: &Uuid) -> Result<Option<Quiz>, RepositoryError> {
        Ok(self.quizzes.read().await.by_module.get(module_id).cloned())
    }

    async fn insert_question(&self, question: &Question) -> Result<(), RepositoryError> {
        let mut quizzes = self.quizzes.write().await;
        let questions = quizzes.questions.entry(question.quiz_id).or_default();
        if questions.iter().any(|q| q.question_id == question.question_id) {
            return Err(RepositoryError::Duplicate("QuizId, QuestionId"));
        }

        questions.push(question.clone());
        Ok(())
    }

    async fn questions(&self, quiz_id: &Uuid) -> Result<Vec<Question>, RepositoryError> {
        Ok(self
            .quizzes
            .read()
            .await
            .questions
            .get(quiz_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AttemptsRepository for MemoryStore {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<(), RepositoryError> {
        self.attempts
            .write()
            .await
            .entry((attempt.user_id, attempt.quiz_id))
            .or_default()
            .push(attempt.clone());

        Ok(())
    }

    /// On equal timestamps the attempt appended last wins.
    async fn latest_attempt(&self, user_id: &Uuid, quiz_id: &Uuid) -> Result<Option<QuizAttempt>, RepositoryError> {
        Ok(self
            .attempts
            .read()
            .await
            .get(&(*user_id, *quiz_id))
            .and_then(|attempts| attempts.iter().max_by_key(|a| a.attempted_at))
            .cloned())
    }

    async fn attempts(&self, user_id: &Uuid, quiz_id: &Uuid) -> Result<Vec<QuizAttempt>, RepositoryError> {
        let mut attempts = self
            .attempts
            .read()
            .await
            .get(&(*user_id, *quiz_id))
            .cloned()
            .unwrap_or_default();
        attempts.sort_by_key(|a| a.attempted_at);

        Ok(attempts)
    }

    async fn attempts_for_quiz(&self, quiz_id: &Uuid) -> Result<Vec<QuizAttempt>, RepositoryError> {
        Ok(self
            .attempts
            .read()
            .await
            .iter()
            .filter(|((_, quiz), _)| quiz == quiz_id)
            .flat_map(|(_, attempts)| attempts.iter().cloned())
            .collect())
    }
}
