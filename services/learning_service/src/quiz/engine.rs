use std::collections::{BTreeMap, HashMap, HashSet};

use uuid::Uuid;

use super::repository::{AttemptsRepository, QuizzesRepository};
use super::scoring;
use super::stats::QuizStats;
use super::types::{AttemptResult, NewQuestion, NewQuiz, OptionLabel, Question, Quiz, QuizAttempt};
use crate::catalog::CatalogRepository;
use crate::enrollment::{EnrollmentGate, EnrollmentsRepository};
use crate::error::{Entity, EngineError};
use crate::request_context::RequestContext;
use crate::store::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizTarget {
    Quiz(Uuid),
    Module(Uuid),
}

/// A question as shown to a learner: the correct option is withheld.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerQuestion {
    pub question_id: Uuid,
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerQuiz {
    pub quiz: Quiz,
    pub questions: Vec<LearnerQuestion>,
}

/// Quiz authoring, attempt scoring and attempt history.
pub struct QuizEngine<'a, S> {
    store: &'a S,
}

impl<'a, S> QuizEngine<'a, S>
where
    S: CatalogRepository + EnrollmentsRepository + QuizzesRepository + AttemptsRepository,
{
    pub fn new(store: &'a S) -> Self {
        QuizEngine { store }
    }

    #[tracing::instrument(skip(self, ctx, input), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn create_quiz(
        &self,
        ctx: &RequestContext,
        module_id: &Uuid,
        input: NewQuiz,
    ) -> Result<Quiz, EngineError> {
        ctx.require_admin()?;
        let input = input.checked()?;
        let module = self
            .store
            .module(module_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Module, *module_id))?;

        let title = match input.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_owned(),
            _ => format!("{} Quiz", module.title),
        };
        let quiz = Quiz::builder()
            .module_id(module.module_id)
            .course_id(module.course_id)
            .title(title)
            .pass_marks(input.pass_marks)
            .total_marks(input.total_marks)
            .build();

        match self.store.insert_quiz(&quiz).await {
            Ok(()) => {
                tracing::info!(quiz_id = %quiz.quiz_id, "Quiz created.");
                Ok(quiz)
            }
            Err(RepositoryError::Duplicate(_)) => {
                Err(EngineError::AlreadyExists(format!("Quiz for module {}", module_id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self, ctx, input), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn add_question(
        &self,
        ctx: &RequestContext,
        quiz_id: &Uuid,
        input: NewQuestion,
    ) -> Result<Question, EngineError> {
        ctx.require_admin()?;
        let input = input.checked()?;
        let quiz = self.quiz(quiz_id).await?;
        let correct_option = input
            .correct_option
            .parse::<OptionLabel>()
            .map_err(|e| EngineError::Validation(e.to_string()))?;

        let question = Question::builder()
            .quiz_id(quiz.quiz_id)
            .text(input.text)
            .option_a(input.option_a)
            .option_b(input.option_b)
            .option_c(input.option_c)
            .option_d(input.option_d)
            .correct_option(correct_option)
            .build();
        self.store.insert_question(&question).await?;
        tracing::info!(question_id = %question.question_id, "Question added.");

        Ok(question)
    }

    /// The quiz and its questions without their answers. Learners need access to the course;
    /// administrators do not.
    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn learner_quiz(&self, ctx: &RequestContext, target: QuizTarget) -> Result<LearnerQuiz, EngineError> {
        let quiz = match target {
            QuizTarget::Quiz(quiz_id) => self.quiz(&quiz_id).await?,
            QuizTarget::Module(module_id) => {
                if self.store.module(&module_id).await?.is_none() {
                    return Err(EngineError::NotFound(Entity::Module, module_id));
                }
                self.store
                    .quiz_for_module(&module_id)
                    .await?
                    .ok_or(EngineError::NotFound(Entity::Quiz, module_id))?
            }
        };
        if !ctx.is_admin() {
            EnrollmentGate::new(self.store)
                .require_access(ctx, &quiz.course_id)
                .await?;
        }

        let questions = self
            .store
            .questions(&quiz.quiz_id)
            .await?
            .into_iter()
            .map(LearnerQuestion::from)
            .collect();

        Ok(LearnerQuiz { quiz, questions })
    }

    /// Scores and records an attempt. Failed attempts are recorded too.
    ///
    /// Answer keys must be question IDs, each named once; keys naming questions of another quiz
    /// are dropped and answers are stored trimmed and upper-cased. Answers are only looked at once
    /// the caller is known to have access to the quiz.
    #[tracing::instrument(skip(self, ctx, answers), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn submit_attempt(
        &self,
        ctx: &RequestContext,
        quiz_id: &Uuid,
        answers: HashMap<String, String>,
    ) -> Result<AttemptResult, EngineError> {
        let quiz = self.quiz(quiz_id).await?;
        EnrollmentGate::new(self.store)
            .require_access(ctx, &quiz.course_id)
            .await?;
        let answers = parse_answers(answers)?;

        let questions = self.store.questions(quiz_id).await?;
        let known: HashSet<Uuid> = questions.iter().map(|q| q.question_id).collect();
        let answers: BTreeMap<Uuid, String> = answers.into_iter().filter(|(id, _)| known.contains(id)).collect();

        let score = scoring::score(&questions, &answers);
        let attempt = QuizAttempt::builder()
            .user_id(ctx.user_id)
            .quiz_id(quiz.quiz_id)
            .answers(answers)
            .score(score)
            .total_questions(questions.len() as u32)
            .passed(scoring::passed(&quiz, score))
            .build();
        self.store.append_attempt(&attempt).await?;
        tracing::info!(
            attempt_id = %attempt.attempt_id,
            score = attempt.score,
            passed = attempt.passed,
            "Quiz attempt recorded."
        );

        Ok(AttemptResult::from(&attempt))
    }

    /// The caller's current attempt on a quiz, `None` if there is none.
    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn latest_attempt(
        &self,
        ctx: &RequestContext,
        quiz_id: &Uuid,
    ) -> Result<Option<QuizAttempt>, EngineError> {
        self.quiz(quiz_id).await?;
        self.latest_attempt_for(&ctx.user_id, quiz_id).await
    }

    /// Latest attempt without checking that the quiz exists.
    pub async fn latest_attempt_for(&self, user_id: &Uuid, quiz_id: &Uuid) -> Result<Option<QuizAttempt>, EngineError> {
        Ok(self.store.latest_attempt(user_id, quiz_id).await?)
    }

    /// Every attempt of the caller on a quiz, oldest first.
    pub async fn attempt_history(&self, ctx: &RequestContext, quiz_id: &Uuid) -> Result<Vec<QuizAttempt>, EngineError> {
        self.quiz(quiz_id).await?;
        Ok(self.store.attempts(&ctx.user_id, quiz_id).await?)
    }

    /// Attempt statistics over every quiz of a course. Administrators only.
    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id, user_id = %ctx.user_id))]
    pub async fn course_stats(&self, ctx: &RequestContext, course_id: &Uuid) -> Result<QuizStats, EngineError> {
        ctx.require_admin()?;
        if self.store.course(course_id).await?.is_none() {
            return Err(EngineError::NotFound(Entity::Course, *course_id));
        }

        let mut attempts = Vec::new();
        for module in self.store.modules(course_id).await? {
            if let Some(quiz) = self.store.quiz_for_module(&module.module_id).await? {
                attempts.extend(self.store.attempts_for_quiz(&quiz.quiz_id).await?);
            }
        }

        Ok(QuizStats::from_attempts(&attempts))
    }

    async fn quiz(&self, quiz_id: &Uuid) -> Result<Quiz, EngineError> {
        self.store
            .quiz(quiz_id)
            .await?
            .ok_or(EngineError::NotFound(Entity::Quiz, *quiz_id))
    }
}

/// Keys parsed as question IDs. Two keys spelling the same ID (e.g. in different case) are
/// rejected, since either answer could be the one scored.
fn parse_answers(answers: HashMap<String, String>) -> Result<BTreeMap<Uuid, String>, EngineError> {
    let mut parsed = BTreeMap::new();
    for (key, value) in answers {
        let id = Uuid::parse_str(key.trim())
            .map_err(|_| EngineError::Validation(format!("Answer key '{}' is not a question ID.", key)))?;
        if parsed.insert(id, value.trim().to_uppercase()).is_some() {
            return Err(EngineError::Validation(format!("Question {} is answered more than once.", id)));
        }
    }

    Ok(parsed)
}

impl From<Question> for LearnerQuestion {
    fn from(question: Question) -> Self {
        LearnerQuestion {
            question_id: question.question_id,
            text: question.text,
            option_a: question.option_a,
            option_b: question.option_b,
            option_c: question.option_c,
            option_d: question.option_d,
        }
    }
}

#[cfg(test)]
mod tests {
    use common_macros::hash_map;

    use super::*;
    use crate::test_support::{admin, course_fixture, enrolled_learner, learner, CourseFixture};

    fn new_quiz(pass_marks: u32, total_marks: u32) -> NewQuiz {
        NewQuiz {
            title: None,
            pass_marks,
            total_marks,
        }
    }

    fn new_question(n: usize, correct: &str) -> NewQuestion {
        NewQuestion {
            text: format!("Question {}", n),
            option_a: "alpha".to_owned(),
            option_b: "beta".to_owned(),
            option_c: "gamma".to_owned(),
            option_d: "delta".to_owned(),
            correct_option: correct.to_owned(),
        }
    }

    /// Quiz on the first module with questions answered A, B, C.
    async fn quiz_with_questions(fixture: &CourseFixture) -> (Quiz, Vec<Question>) {
        let engine = QuizEngine::new(&fixture.store);
        let ctx = admin();
        let quiz = engine
            .create_quiz(&ctx, &fixture.m1.module_id, new_quiz(2, 3))
            .await
            .unwrap();

        let mut questions = Vec::new();
        for (n, label) in ["A", "B", "C"].iter().enumerate() {
            questions.push(engine.add_question(&ctx, &quiz.quiz_id, new_question(n, label)).await.unwrap());
        }

        (quiz, questions)
    }

    fn answers(questions: &[Question], labels: &[&str]) -> HashMap<String, String> {
        questions
            .iter()
            .zip(labels)
            .map(|(q, l)| (q.question_id.to_string(), l.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn one_quiz_per_module() {
        let fixture = course_fixture().await;
        let engine = QuizEngine::new(&fixture.store);
        let ctx = admin();

        let quiz = engine
            .create_quiz(&ctx, &fixture.m1.module_id, new_quiz(3, 5))
            .await
            .unwrap();
        assert_eq!(format!("{} Quiz", fixture.m1.title), quiz.title);
        assert_eq!(fixture.course.course_id, quiz.course_id);

        let err = engine
            .create_quiz(&ctx, &fixture.m1.module_id, new_quiz(1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn learners_cannot_author() {
        let fixture = course_fixture().await;
        let engine = QuizEngine::new(&fixture.store);
        let ctx = enrolled_learner(&fixture).await;

        assert!(matches!(
            engine.create_quiz(&ctx, &fixture.m1.module_id, new_quiz(3, 5)).await,
            Err(EngineError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn invalid_marks_are_rejected() {
        let fixture = course_fixture().await;
        let engine = QuizEngine::new(&fixture.store);

        assert!(matches!(
            engine.create_quiz(&admin(), &fixture.m1.module_id, new_quiz(6, 5)).await,
            Err(EngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn question_needs_valid_label() {
        let fixture = course_fixture().await;
        let (quiz, _) = quiz_with_questions(&fixture).await;
        let engine = QuizEngine::new(&fixture.store);

        let err = engine
            .add_question(&admin(), &quiz.quiz_id, new_question(9, "F"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let question = engine
            .add_question(&admin(), &quiz.quiz_id, new_question(9, "d"))
            .await
            .unwrap();
        assert_eq!(OptionLabel::D, question.correct_option);
    }

    #[tokio::test]
    async fn question_for_unknown_quiz_is_not_found() {
        let fixture = course_fixture().await;
        let engine = QuizEngine::new(&fixture.store);

        assert!(matches!(
            engine.add_question(&admin(), &Uuid::new_v4(), new_question(0, "A")).await,
            Err(EngineError::NotFound(Entity::Quiz, _))
        ));
    }

    #[tokio::test]
    async fn learner_view_hides_answers_and_needs_access() {
        let fixture = course_fixture().await;
        let (quiz, questions) = quiz_with_questions(&fixture).await;
        let engine = QuizEngine::new(&fixture.store);

        assert!(matches!(
            engine.learner_quiz(&learner(), QuizTarget::Quiz(quiz.quiz_id)).await,
            Err(EngineError::AccessDenied(_))
        ));

        let ctx = enrolled_learner(&fixture).await;
        let view = engine
            .learner_quiz(&ctx, QuizTarget::Module(fixture.m1.module_id))
            .await
            .unwrap();
        assert_eq!(quiz, view.quiz);
        let ids: Vec<Uuid> = view.questions.iter().map(|q| q.question_id).collect();
        let expected: Vec<Uuid> = questions.iter().map(|q| q.question_id).collect();
        assert_eq!(expected, ids);

        assert!(matches!(
            engine.learner_quiz(&ctx, QuizTarget::Module(fixture.m2.module_id)).await,
            Err(EngineError::NotFound(Entity::Quiz, _))
        ));
    }

    #[tokio::test]
    async fn scores_attempts_and_records_failures() {
        let fixture = course_fixture().await;
        let (quiz, questions) = quiz_with_questions(&fixture).await;
        let engine = QuizEngine::new(&fixture.store);
        let ctx = enrolled_learner(&fixture).await;

        let failed = engine
            .submit_attempt(&ctx, &quiz.quiz_id, answers(&questions, &["A", "D"]))
            .await
            .unwrap();
        assert_eq!(1, failed.score);
        assert_eq!(3, failed.total_questions);
        assert!(!failed.passed);

        let passed = engine
            .submit_attempt(&ctx, &quiz.quiz_id, answers(&questions, &[" a ", "b", "D"]))
            .await
            .unwrap();
        assert_eq!(2, passed.score);
        assert!(passed.passed);

        let history = engine.attempt_history(&ctx, &quiz.quiz_id).await.unwrap();
        assert_eq!(2, history.len());
        assert_eq!(failed.attempt_id, history[0].attempt_id);
        assert_eq!(Some("A"), history[1].answers.get(&questions[0].question_id).map(String::as_str));
    }

    #[tokio::test]
    async fn latest_attempt_governs() {
        let fixture = course_fixture().await;
        let (quiz, questions) = quiz_with_questions(&fixture).await;
        let engine = QuizEngine::new(&fixture.store);
        let ctx = enrolled_learner(&fixture).await;

        assert_eq!(None, engine.latest_attempt(&ctx, &quiz.quiz_id).await.unwrap());

        engine
            .submit_attempt(&ctx, &quiz.quiz_id, answers(&questions, &["A", "B", "C"]))
            .await
            .unwrap();
        let last = engine
            .submit_attempt(&ctx, &quiz.quiz_id, HashMap::new())
            .await
            .unwrap();

        let latest = engine.latest_attempt(&ctx, &quiz.quiz_id).await.unwrap().unwrap();
        assert_eq!(last.attempt_id, latest.attempt_id);
        assert!(!latest.passed);
    }

    #[tokio::test]
    async fn answer_keys_must_be_ids() {
        let fixture = course_fixture().await;
        let (quiz, questions) = quiz_with_questions(&fixture).await;
        let engine = QuizEngine::new(&fixture.store);
        let ctx = enrolled_learner(&fixture).await;

        let err = engine
            .submit_attempt(&ctx, &quiz.quiz_id, hash_map! { "first".to_owned() => "A".to_owned() })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let mut submitted = answers(&questions, &["A"]);
        submitted.insert(Uuid::new_v4().to_string(), "A".to_owned());
        let result = engine.submit_attempt(&ctx, &quiz.quiz_id, submitted).await.unwrap();
        assert_eq!(1, result.score);
        let latest = engine.latest_attempt(&ctx, &quiz.quiz_id).await.unwrap().unwrap();
        assert_eq!(1, latest.answers.len());
    }

    #[tokio::test]
    async fn same_question_twice_is_rejected() {
        let fixture = course_fixture().await;
        let (quiz, questions) = quiz_with_questions(&fixture).await;
        let engine = QuizEngine::new(&fixture.store);
        let ctx = enrolled_learner(&fixture).await;
        let id = questions[0].question_id.to_string();

        let err = engine
            .submit_attempt(
                &ctx,
                &quiz.quiz_id,
                hash_map! {
                    id.clone() => "A".to_owned(),
                    id.to_uppercase() => "B".to_owned(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(msg) if msg.contains("more than once")));
        assert!(engine.attempt_history(&ctx, &quiz.quiz_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn access_is_checked_before_answers() {
        let fixture = course_fixture().await;
        let (quiz, _) = quiz_with_questions(&fixture).await;
        let engine = QuizEngine::new(&fixture.store);
        let malformed = || hash_map! { "first".to_owned() => "A".to_owned() };

        assert!(matches!(
            engine.submit_attempt(&learner(), &quiz.quiz_id, malformed()).await,
            Err(EngineError::AccessDenied(_))
        ));
        assert!(matches!(
            engine
                .submit_attempt(&enrolled_learner(&fixture).await, &Uuid::new_v4(), malformed())
                .await,
            Err(EngineError::NotFound(Entity::Quiz, _))
        ));
    }

    #[tokio::test]
    async fn not_enrolled_cannot_submit() {
        let fixture = course_fixture().await;
        let (quiz, questions) = quiz_with_questions(&fixture).await;
        let engine = QuizEngine::new(&fixture.store);
        let ctx = learner();

        assert!(matches!(
            engine
                .submit_attempt(&ctx, &quiz.quiz_id, answers(&questions, &["A", "B", "C"]))
                .await,
            Err(EngineError::AccessDenied(_))
        ));
        assert!(engine.attempt_history(&ctx, &quiz.quiz_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn course_stats_cover_all_learners() {
        let fixture = course_fixture().await;
        let (quiz, questions) = quiz_with_questions(&fixture).await;
        let engine = QuizEngine::new(&fixture.store);
        let first = enrolled_learner(&fixture).await;
        let second = enrolled_learner(&fixture).await;

        engine
            .submit_attempt(&first, &quiz.quiz_id, answers(&questions, &["A", "B", "C"]))
            .await
            .unwrap();
        engine
            .submit_attempt(&second, &quiz.quiz_id, answers(&questions, &["A"]))
            .await
            .unwrap();

        assert!(matches!(
            engine.course_stats(&first, &fixture.course.course_id).await,
            Err(EngineError::AccessDenied(_))
        ));

        let stats = engine.course_stats(&admin(), &fixture.course.course_id).await.unwrap();
        assert_eq!(2, stats.total_attempts);
        assert_eq!(1, stats.passed);
        assert_eq!(50, stats.pass_percentage);
        assert_eq!(first.user_id, stats.top_learners[0].user_id);
    }
}
