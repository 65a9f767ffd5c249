use async_trait::async_trait;
use aws_sdk_dynamodb::model::Select;
use common_macros::hash_map;
use service_core::ddb::put_item::PutItemInput;
use service_core::ddb::query::QueryInput;
use service_core::ddb::Item;
use uuid::Uuid;

use super::item::{s, to_item, user_quiz_key, AttemptItem, ModuleQuizGuard};
use super::{partition, DdbStore, ThreadSafeDdbClient, PAGE_SIZE};
use crate::quiz::{AttemptsRepository, Question, Quiz, QuizAttempt, QuizzesRepository};
use crate::store::RepositoryError;

#[async_trait]
impl<T: ThreadSafeDdbClient> QuizzesRepository for DdbStore<T> {
    /// Writes the quiz and the guard of its module together; either both land or neither does.
    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), RepositoryError> {
        let put = |item: Item| {
            PutItemInput::builder()
                .table_name(self.tables.quizzes.as_str())
                .item(item)
                .condition_expression("attribute_not_exists(QuizId)")
                .build()
        };
        let puts = vec![put(to_item(quiz)?), put(to_item(&ModuleQuizGuard::from(quiz))?)];

        self.put_all_unique(puts, "ModuleId").await
    }

    async fn quiz(&self, quiz_id: &Uuid) -> Result<Option<Quiz>, RepositoryError> {
        let key = hash_map! {
            "QuizId".to_owned() => s(quiz_id),
        };
        self.get(&self.tables.quizzes, key).await
    }

    async fn quiz_for_module(&self, module_id: &Uuid) -> Result<Option<Quiz>, RepositoryError> {
        let key = hash_map! {
            "QuizId".to_owned() => s(ModuleQuizGuard::key(module_id)),
        };
        match self.get::<ModuleQuizGuard>(&self.tables.quizzes, key).await? {
            Some(guard) => self.quiz(&guard.module_quiz_id).await,
            None => Ok(None),
        }
    }

    async fn insert_question(&self, question: &Question) -> Result<(), RepositoryError> {
        self.put_unique(
            &self.tables.questions,
            question,
            "attribute_not_exists(QuizId) AND attribute_not_exists(QuestionId)",
            "QuizId, QuestionId",
        )
        .await
    }

    async fn questions(&self, quiz_id: &Uuid) -> Result<Vec<Question>, RepositoryError> {
        let mut questions: Vec<Question> = self
            .query_records(partition(&self.tables.questions, "QuizId", quiz_id.to_string()))
            .await?;
        // Sorted by ID in the table.
        questions.sort_by_key(|q| q.created_at);

        Ok(questions)
    }
}

#[async_trait]
impl<T: ThreadSafeDdbClient> AttemptsRepository for DdbStore<T> {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<(), RepositoryError> {
        self.put_unique(
            &self.tables.attempts,
            &AttemptItem::from(attempt),
            "attribute_not_exists(UserQuiz) AND attribute_not_exists(AttemptKey)",
            "UserQuiz, AttemptKey",
        )
        .await
    }

    /// On equal timestamps the greater attempt ID wins.
    async fn latest_attempt(&self, user_id: &Uuid, quiz_id: &Uuid) -> Result<Option<QuizAttempt>, RepositoryError> {
        let input = QueryInput::builder()
            .table_name(self.tables.attempts.as_str())
            .key_condition_expression("UserQuiz = :value")
            .expression_attribute_values(hash_map! {
                ":value".to_owned() => s(user_quiz_key(user_id, quiz_id)),
            })
            .scan_index_forward(false)
            .limit(1)
            .consistent_read(true)
            .build();

        self.query_first(input).await
    }

    async fn attempts(&self, user_id: &Uuid, quiz_id: &Uuid) -> Result<Vec<QuizAttempt>, RepositoryError> {
        self.query_records(partition(
            &self.tables.attempts,
            "UserQuiz",
            user_quiz_key(user_id, quiz_id),
        ))
        .await
    }

    async fn attempts_for_quiz(&self, quiz_id: &Uuid) -> Result<Vec<QuizAttempt>, RepositoryError> {
        let input = QueryInput::builder()
            .table_name(self.tables.attempts.as_str())
            .index_name("QuizIdIndex")
            .key_condition_expression("QuizId = :value")
            .select(Select::AllProjectedAttributes)
            .expression_attribute_values(hash_map! {
                ":value".to_owned() => s(quiz_id),
            })
            .limit(PAGE_SIZE)
            .build();

        self.query_records(input).await
    }
}
