use crate::engine::LearningEngine;
use crate::operations::{acting_for, OperationResult};
use crate::pb::{ListEnrollmentsInput, ListEnrollmentsOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn list_enrollments(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: ListEnrollmentsInput,
) -> OperationResult<ListEnrollmentsOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let enrollments = engine.gate().enrollments(&ctx).await?;

    Ok(ListEnrollmentsOutput {
        enrollments: enrollments.into_iter().map(Into::into).collect(),
    })
}
