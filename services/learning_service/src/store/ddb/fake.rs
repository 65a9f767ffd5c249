//! In-memory DynamoDB for store tests. Every condition the store writes is `attribute_not_exists`
//! on the key, so a conditional put fails exactly when a row with the same key is present.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::{
    ConditionalCheckFailedException, GetItemError, PutItemError, PutItemErrorKind, QueryError,
    TransactWriteItemsError, TransactWriteItemsErrorKind, TransactionCanceledException,
};
use aws_sdk_dynamodb::model::{AttributeValue, CancellationReason};
use aws_sdk_dynamodb::output::{GetItemOutput, PutItemOutput, QueryOutput, TransactWriteItemsOutput};
use aws_sdk_dynamodb::types::SdkError;
use aws_smithy_http::body::SdkBody;
use aws_smithy_http::operation;
use service_core::ddb::get_item::{GetItem, GetItemInput};
use service_core::ddb::put_item::{PutItem, PutItemInput};
use service_core::ddb::query::{Query, QueryInput};
use service_core::ddb::transact_write_items::{TransactWriteItems, CONDITIONAL_CHECK_FAILED};
use service_core::ddb::Item;

use super::DdbTables;

pub fn tables() -> DdbTables {
    DdbTables {
        courses: "Courses".to_owned(),
        modules: "Modules".to_owned(),
        lessons: "Lessons".to_owned(),
        enrollments: "Enrollments".to_owned(),
        completions: "Completions".to_owned(),
        quizzes: "Quizzes".to_owned(),
        questions: "Questions".to_owned(),
        attempts: "Attempts".to_owned(),
    }
}

fn key_attributes(table: &str) -> &'static [&'static str] {
    match table {
        "Courses" => &["CourseId"],
        "Modules" => &["CourseId", "Order"],
        "Lessons" => &["ModuleId", "Order"],
        "Enrollments" => &["UserId", "CourseId"],
        "Completions" => &["UserId", "LessonId"],
        "Quizzes" => &["QuizId"],
        "Questions" => &["QuizId", "QuestionId"],
        "Attempts" => &["UserQuiz", "AttemptKey"],
        other => panic!("unknown table {}", other),
    }
}

/// Rows per table in insertion order. Queries are served from `pages` while it holds canned
/// output, and evaluated against the rows otherwise.
#[derive(Default)]
pub struct FakeDdb {
    rows: Mutex<HashMap<String, Vec<Item>>>,
    pub queries: Mutex<Vec<QueryInput>>,
    pub pages: Mutex<Vec<QueryOutput>>,
    pub transactions: Mutex<usize>,
}

impl FakeDdb {
    /// Stores `item` as is, bypassing conditions.
    pub fn seed(&self, table: &str, item: Item) {
        self.rows.lock().unwrap().entry(table.to_owned()).or_default().push(item);
    }

    pub fn rows(&self, table: &str) -> Vec<Item> {
        self.rows.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    fn same_key(table: &str, a: &Item, b: &Item) -> bool {
        key_attributes(table).iter().all(|name| a.get(*name) == b.get(*name))
    }

    fn conflicts(rows: &HashMap<String, Vec<Item>>, input: &PutItemInput) -> bool {
        input.condition_expression.is_some()
            && rows
                .get(&input.table_name)
                .map(|rows| rows.iter().any(|row| Self::same_key(&input.table_name, row, &input.item)))
                .unwrap_or(false)
    }

    fn write(rows: &mut HashMap<String, Vec<Item>>, input: PutItemInput) {
        let table = rows.entry(input.table_name.clone()).or_default();
        table.retain(|row| !Self::same_key(&input.table_name, row, &input.item));
        table.push(input.item);
    }
}

fn raw_response() -> operation::Response {
    operation::Response::new(http::Response::new(SdkBody::empty()))
}

fn conditional_check_failed() -> SdkError<PutItemError> {
    let kind = PutItemErrorKind::ConditionalCheckFailedException(
        ConditionalCheckFailedException::builder()
            .message("The conditional request failed")
            .build(),
    );
    SdkError::ServiceError {
        err: PutItemError::new(
            kind,
            aws_smithy_types::Error::builder()
                .code("ConditionalCheckFailedException")
                .build(),
        ),
        raw: raw_response(),
    }
}

fn transaction_cancelled(codes: Vec<&str>) -> SdkError<TransactWriteItemsError> {
    let reasons = codes
        .into_iter()
        .map(|code| CancellationReason::builder().code(code).build())
        .collect();
    let kind = TransactWriteItemsErrorKind::TransactionCanceledException(
        TransactionCanceledException::builder()
            .set_cancellation_reasons(Some(reasons))
            .build(),
    );
    SdkError::ServiceError {
        err: TransactWriteItemsError::new(
            kind,
            aws_smithy_types::Error::builder()
                .code("TransactionCanceledException")
                .build(),
        ),
        raw: raw_response(),
    }
}

/// Evaluates `Name = :placeholder` clauses joined by `AND` against `row`.
fn matches(expression: &str, values: &HashMap<String, AttributeValue>, row: &Item) -> bool {
    expression.split(" AND ").all(|clause| match clause.split_once(" = ") {
        Some((name, placeholder)) => row.get(name.trim()) == values.get(placeholder.trim()),
        None => panic!("unsupported expression {}", clause),
    })
}

#[async_trait]
impl GetItem for FakeDdb {
    async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, SdkError<GetItemError>> {
        let item = self
            .rows(&input.table_name)
            .into_iter()
            .find(|row| input.key.iter().all(|(name, value)| row.get(name) == Some(value)));

        Ok(GetItemOutput::builder().set_item(item).build())
    }
}

#[async_trait]
impl PutItem for FakeDdb {
    async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, SdkError<PutItemError>> {
        let mut rows = self.rows.lock().unwrap();
        if Self::conflicts(&rows, &input) {
            return Err(conditional_check_failed());
        }
        Self::write(&mut rows, input);

        Ok(PutItemOutput::builder().build())
    }
}

#[async_trait]
impl Query for FakeDdb {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<QueryError>> {
        self.queries.lock().unwrap().push(input.clone());
        {
            let mut pages = self.pages.lock().unwrap();
            if !pages.is_empty() {
                return Ok(pages.remove(0));
            }
        }

        let values = input.expression_attribute_values.clone().unwrap_or_default();
        let mut items: Vec<Item> = self
            .rows(&input.table_name)
            .into_iter()
            .filter(|row| matches(&input.key_condition_expression, &values, row))
            .filter(|row| {
                input
                    .filter_expression
                    .as_ref()
                    .map_or(true, |filter| matches(filter, &values, row))
            })
            .collect();
        if !input.scan_index_forward {
            items.reverse();
        }
        items.truncate(input.limit.max(0) as usize);

        Ok(QueryOutput::builder().set_items(Some(items)).build())
    }
}

#[async_trait]
impl TransactWriteItems for FakeDdb {
    async fn transact_write_items(
        &self,
        puts: Vec<PutItemInput>,
    ) -> Result<TransactWriteItemsOutput, SdkError<TransactWriteItemsError>> {
        *self.transactions.lock().unwrap() += 1;
        let mut rows = self.rows.lock().unwrap();
        let codes: Vec<&str> = puts
            .iter()
            .map(|put| {
                if Self::conflicts(&rows, put) {
                    CONDITIONAL_CHECK_FAILED
                } else {
                    "None"
                }
            })
            .collect();
        if codes.contains(&CONDITIONAL_CHECK_FAILED) {
            return Err(transaction_cancelled(codes));
        }
        for put in puts {
            Self::write(&mut rows, put);
        }

        Ok(TransactWriteItemsOutput::builder().build())
    }
}
