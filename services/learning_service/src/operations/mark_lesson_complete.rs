use crate::engine::LearningEngine;
use crate::operations::{acting_for, parse_id, OperationResult};
use crate::pb::{MarkLessonCompleteInput, MarkLessonCompleteOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn mark_lesson_complete(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: MarkLessonCompleteInput,
) -> OperationResult<MarkLessonCompleteOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let lesson_id = parse_id(&input.lesson_id, "LessonId")?;

    let completion = engine
        .tracker()
        .mark_lesson_complete(&ctx, &lesson_id, input.watched_seconds)
        .await?;

    Ok(MarkLessonCompleteOutput {
        completion: Some(completion.into()),
    })
}
