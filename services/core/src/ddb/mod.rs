use std::collections::HashMap;

use aws_sdk_dynamodb::model::AttributeValue;

pub mod adapter;
pub mod get_item;
pub mod put_item;
pub mod query;
pub mod transact_write_items;

pub use adapter::Adapter;

/// A DynamoDB item, as sent and received by the SDK.
pub type Item = HashMap<String, AttributeValue>;
