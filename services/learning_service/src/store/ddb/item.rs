//! Conversion between records and DynamoDB items through their serde derives. Attribute names are
//! the PascalCase field names.

use aws_sdk_dynamodb::model::AttributeValue;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_dynamo::aws_sdk_dynamodb_0_9 as dynamo;
use service_core::ddb::Item;
use uuid::Uuid;

use crate::quiz::{Quiz, QuizAttempt};
use crate::store::RepositoryError;

pub fn to_item<R: Serialize>(record: &R) -> Result<Item, RepositoryError> {
    dynamo::to_item(record).map_err(|e| RepositoryError::Malformed(e.to_string()))
}

pub fn from_item<R: DeserializeOwned>(item: Item) -> Result<R, RepositoryError> {
    dynamo::from_item(item).map_err(|e| RepositoryError::Malformed(e.to_string()))
}

pub fn s(value: impl ToString) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

/// Fixed width so that lexical order of the attribute is chronological order.
fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn user_quiz_key(user_id: &Uuid, quiz_id: &Uuid) -> String {
    format!("{}#{}", user_id, quiz_id)
}

/// An attempt row: the attempt plus its partition key and its sort key, the timestamp followed by
/// the attempt ID. Reads decode straight into [`QuizAttempt`] and ignore the key attributes.
#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct AttemptItem<'a> {
    user_quiz: String,
    attempt_key: String,
    #[serde(flatten)]
    attempt: &'a QuizAttempt,
}

impl<'a> From<&'a QuizAttempt> for AttemptItem<'a> {
    fn from(attempt: &'a QuizAttempt) -> Self {
        AttemptItem {
            user_quiz: user_quiz_key(&attempt.user_id, &attempt.quiz_id),
            attempt_key: format!("{}#{}", timestamp(&attempt.attempted_at), attempt.attempt_id),
            attempt,
        }
    }
}

/// Claims a module for one quiz. Stored in the quizzes table next to the quizzes, under a key no
/// quiz ID can take.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleQuizGuard {
    quiz_id: String,
    pub module_id: Uuid,
    pub module_quiz_id: Uuid,
}

impl ModuleQuizGuard {
    pub fn key(module_id: &Uuid) -> String {
        format!("Module#{}", module_id)
    }
}

impl From<&Quiz> for ModuleQuizGuard {
    fn from(quiz: &Quiz) -> Self {
        ModuleQuizGuard {
            quiz_id: ModuleQuizGuard::key(&quiz.module_id),
            module_id: quiz.module_id,
            module_quiz_id: quiz.quiz_id,
        }
    }
}
