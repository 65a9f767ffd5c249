use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::QueryError;
use aws_sdk_dynamodb::model::{AttributeValue, Select};
use aws_sdk_dynamodb::output::QueryOutput;
use aws_sdk_dynamodb::types::SdkError;
use typed_builder::TypedBuilder;

use super::adapter::Adapter;
use super::Item;

#[derive(Debug, Clone, TypedBuilder)]
pub struct QueryInput {
    #[builder(setter(into))]
    pub table_name: String,

    #[builder(default, setter(strip_option, into))]
    pub index_name: Option<String>,

    #[builder(setter(into))]
    pub limit: i32,

    #[builder(default, setter(strip_option))]
    pub select: Option<Select>,

    #[builder(default)]
    pub exclusive_start_key: Option<Item>,

    #[builder(default = true)]
    pub scan_index_forward: bool,

    #[builder(setter(into))]
    pub key_condition_expression: String,

    #[builder(default, setter(strip_option, into))]
    pub filter_expression: Option<String>,

    #[builder(default, setter(strip_option))]
    pub expression_attribute_names: Option<HashMap<String, String>>,

    #[builder(default, setter(strip_option))]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,

    #[builder(default = false)]
    pub consistent_read: bool,
}

#[async_trait]
pub trait Query {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<QueryError>>;
}

#[async_trait]
impl Query for Adapter {
    async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<QueryError>> {
        self.raw
            .query()
            .table_name(input.table_name)
            .set_index_name(input.index_name)
            .limit(input.limit)
            .set_select(input.select)
            .set_exclusive_start_key(input.exclusive_start_key)
            .set_filter_expression(input.filter_expression)
            .set_expression_attribute_names(input.expression_attribute_names)
            .set_expression_attribute_values(input.expression_attribute_values)
            .consistent_read(input.consistent_read)
            .scan_index_forward(input.scan_index_forward)
            .key_condition_expression(input.key_condition_expression)
            .send()
            .await
    }
}

/// Runs `input` page by page until the key condition is exhausted and returns every item, in the
/// order DynamoDB produced them. `input.limit` is used as the page size.
pub async fn query_all(ddb: &(impl Query + Sync), mut input: QueryInput) -> Result<Vec<Item>, SdkError<QueryError>> {
    let mut items = Vec::new();
    loop {
        let output = ddb.query(input.clone()).await?;
        if let Some(page) = output.items {
            items.extend(page);
        }

        match output.last_evaluated_key {
            Some(key) if !key.is_empty() => input.exclusive_start_key = Some(key),
            _ => return Ok(items),
        }
    }
}
