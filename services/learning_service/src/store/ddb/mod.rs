//! DynamoDB backend.
//!
//! | Table       | Partition key | Sort key     | Index                 |
//! |-------------|---------------|--------------|-----------------------|
//! | Courses     | `CourseId`    |              |                       |
//! | Modules     | `CourseId`    | `Order`      | `ModuleIdIndex`       |
//! | Lessons     | `ModuleId`    | `Order`      | `LessonIdIndex`       |
//! | Enrollments | `UserId`      | `CourseId`   | `CourseIdIndex`       |
//! | Completions | `UserId`      | `LessonId`   |                       |
//! | Quizzes     | `QuizId`      |              |                       |
//! | Questions   | `QuizId`      | `QuestionId` |                       |
//! | Attempts    | `UserQuiz`    | `AttemptKey` | `QuizIdIndex`         |
//!
//! Writes that must be unique are conditional puts on the key attributes, so DynamoDB rejects
//! the second writer. Indexes project all attributes.
//!
//! A quiz is written together with a guard row keyed `Module#<ModuleId>` in the same table, in one
//! transaction, so a module never gets a second quiz. Both quizzes and guards are read with
//! consistent `GetItem` calls; only statistics and catalog lookups go through indexes.

mod catalog;
#[cfg(test)]
mod fake;
mod item;
mod learners;
mod quizzes;

use std::error::Error;

use aws_sdk_dynamodb::model::Select;
use serde::de::DeserializeOwned;
use serde::Serialize;
use service_core::ddb::get_item::{GetItem, GetItemInput};
use service_core::ddb::put_item::{is_conditional_check_failed, PutItem, PutItemInput};
use service_core::ddb::query::{query_all, Query, QueryInput};
use service_core::ddb::transact_write_items::{is_transaction_conditional_check_failed, TransactWriteItems};
use service_core::ddb::Item;

use self::item::{from_item, to_item};
use super::RepositoryError;

const PAGE_SIZE: i32 = 100;

pub trait ThreadSafeDdbClient: GetItem + PutItem + Query + TransactWriteItems + Send + Sync {}
impl<T: GetItem + PutItem + Query + TransactWriteItems + Send + Sync> ThreadSafeDdbClient for T {}

#[derive(Debug, Clone)]
pub struct DdbTables {
    pub courses: String,
    pub modules: String,
    pub lessons: String,
    pub enrollments: String,
    pub completions: String,
    pub quizzes: String,
    pub questions: String,
    pub attempts: String,
}

pub struct DdbStore<T: ThreadSafeDdbClient> {
    ddb: T,
    tables: DdbTables,
}

impl<T: ThreadSafeDdbClient> DdbStore<T> {
    pub fn new(ddb: T, tables: DdbTables) -> Self {
        DdbStore { ddb, tables }
    }

    async fn get<R: DeserializeOwned>(&self, table: &str, key: Item) -> Result<Option<R>, RepositoryError> {
        let input = GetItemInput::builder()
            .table_name(table)
            .key(key)
            .consistent_read(true)
            .build();
        let output = self.ddb.get_item(input).await.map_err(datastore_error)?;

        output.item.map(from_item).transpose()
    }

    /// Puts `record` unless `condition` fails, in which case the row already exists.
    async fn put_unique<R: Serialize + Sync>(
        &self,
        table: &str,
        record: &R,
        condition: &str,
        constraint: &'static str,
    ) -> Result<(), RepositoryError> {
        let input = PutItemInput::builder()
            .table_name(table)
            .item(to_item(record)?)
            .condition_expression(condition)
            .build();

        match self.ddb.put_item(input).await {
            Ok(_) => Ok(()),
            Err(e) if is_conditional_check_failed(&e) => Err(RepositoryError::Duplicate(constraint)),
            Err(e) => Err(datastore_error(e)),
        }
    }

    /// Conditional puts applied in one transaction. Nothing is written when any condition fails.
    async fn put_all_unique(&self, puts: Vec<PutItemInput>, constraint: &'static str) -> Result<(), RepositoryError> {
        match self.ddb.transact_write_items(puts).await {
            Ok(_) => Ok(()),
            Err(e) if is_transaction_conditional_check_failed(&e) => Err(RepositoryError::Duplicate(constraint)),
            Err(e) => Err(datastore_error(e)),
        }
    }

    async fn query_records<R: DeserializeOwned>(&self, input: QueryInput) -> Result<Vec<R>, RepositoryError> {
        query_all(&self.ddb, input)
            .await
            .map_err(datastore_error)?
            .into_iter()
            .map(from_item)
            .collect()
    }

    /// First record of a single page of `input`.
    async fn query_first<R: DeserializeOwned>(&self, input: QueryInput) -> Result<Option<R>, RepositoryError> {
        let output = self.ddb.query(input).await.map_err(datastore_error)?;

        output
            .items
            .and_then(|items| items.into_iter().next())
            .map(from_item)
            .transpose()
    }
}

/// Single-item lookup through an index keyed on `attribute`.
fn index_lookup(table: &str, index: &str, attribute: &str, value: String) -> QueryInput {
    QueryInput::builder()
        .table_name(table)
        .index_name(index)
        .key_condition_expression(format!("{} = :value", attribute))
        .select(Select::AllProjectedAttributes)
        .expression_attribute_values(common_macros::hash_map! {
            ":value".to_owned() => item::s(value),
        })
        .limit(1)
        .build()
}

/// Every row under one partition key, by ascending sort key.
fn partition(table: &str, attribute: &str, value: String) -> QueryInput {
    QueryInput::builder()
        .table_name(table)
        .key_condition_expression(format!("{} = :value", attribute))
        .expression_attribute_values(common_macros::hash_map! {
            ":value".to_owned() => item::s(value),
        })
        .limit(PAGE_SIZE)
        .consistent_read(true)
        .build()
}

fn datastore_error<E: Error + Send + Sync + 'static>(err: E) -> RepositoryError {
    tracing::error!(error = ?err, "DynamoDB call failed.");
    RepositoryError::Other(Box::new(err))
}
