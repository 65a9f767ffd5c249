use async_trait::async_trait;
use aws_sdk_dynamodb::error::{TransactWriteItemsError, TransactWriteItemsErrorKind};
use aws_sdk_dynamodb::model::{Put, TransactWriteItem};
use aws_sdk_dynamodb::output::TransactWriteItemsOutput;
use aws_sdk_dynamodb::types::SdkError;

use super::adapter::Adapter;
use super::put_item::PutItemInput;

/// Code of a cancellation reason whose condition expression did not hold.
pub const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailed";

#[async_trait]
pub trait TransactWriteItems {
    /// Applies every put or none of them.
    async fn transact_write_items(
        &self,
        puts: Vec<PutItemInput>,
    ) -> Result<TransactWriteItemsOutput, SdkError<TransactWriteItemsError>>;
}

#[async_trait]
impl TransactWriteItems for Adapter {
    async fn transact_write_items(
        &self,
        puts: Vec<PutItemInput>,
    ) -> Result<TransactWriteItemsOutput, SdkError<TransactWriteItemsError>> {
        let items = puts
            .into_iter()
            .map(|input| {
                let put = Put::builder()
                    .table_name(input.table_name)
                    .set_item(Some(input.item))
                    .set_condition_expression(input.condition_expression)
                    .set_expression_attribute_names(input.expression_attribute_names)
                    .set_expression_attribute_values(input.expression_attribute_values)
                    .build();
                TransactWriteItem::builder().put(put).build()
            })
            .collect();

        self.raw.transact_write_items().set_transact_items(Some(items)).send().await
    }
}

/// Whether a transaction was cancelled because the condition of one of its puts did not hold.
/// Cancellations for any other reason (conflicts, throttling) are not duplicates.
pub fn is_transaction_conditional_check_failed(err: &SdkError<TransactWriteItemsError>) -> bool {
    match err {
        SdkError::ServiceError {
            err:
                TransactWriteItemsError {
                    kind: TransactWriteItemsErrorKind::TransactionCanceledException(cancelled),
                    ..
                },
            ..
        } => cancelled
            .cancellation_reasons()
            .unwrap_or_default()
            .iter()
            .any(|reason| reason.code() == Some(CONDITIONAL_CHECK_FAILED)),
        _ => false,
    }
}
