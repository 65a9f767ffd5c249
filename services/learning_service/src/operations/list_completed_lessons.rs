use crate::engine::LearningEngine;
use crate::operations::{acting_for, parse_id, OperationResult};
use crate::pb::{ListCompletedLessonsInput, ListCompletedLessonsOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn list_completed_lessons(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: ListCompletedLessonsInput,
) -> OperationResult<ListCompletedLessonsOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let module_id = parse_id(&input.module_id, "ModuleId")?;

    let lesson_ids = engine.tracker().completed_lessons(&ctx, &module_id).await?;

    Ok(ListCompletedLessonsOutput {
        lesson_ids: lesson_ids.iter().map(ToString::to_string).collect(),
    })
}
