use crate::engine::LearningEngine;
use crate::operations::{acting_for, parse_id, OperationResult};
use crate::pb::check_access_output::Access;
use crate::pb::{CheckAccessInput, CheckAccessOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn check_access(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: CheckAccessInput,
) -> OperationResult<CheckAccessOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let course_id = parse_id(&input.course_id, "CourseId")?;

    let access = engine.gate().check_access(&ctx, &course_id).await?;

    Ok(CheckAccessOutput {
        access: Access::from(access) as i32,
    })
}
