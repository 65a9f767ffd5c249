use crate::engine::LearningEngine;
use crate::operations::{acting_for, parse_id, OperationResult};
use crate::pb::{EnrollInput, EnrollOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn enroll(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: EnrollInput,
) -> OperationResult<EnrollOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let course_id = parse_id(&input.course_id, "CourseId")?;

    let outcome = engine.gate().enroll(&ctx, &course_id).await?;

    Ok(EnrollOutput {
        enrollment: Some(outcome.enrollment.into()),
        created: outcome.created,
    })
}
