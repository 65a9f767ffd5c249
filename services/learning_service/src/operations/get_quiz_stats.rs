use crate::engine::LearningEngine;
use crate::operations::{parse_id, OperationResult};
use crate::pb::{GetQuizStatsInput, GetQuizStatsOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn get_quiz_stats(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: GetQuizStatsInput,
) -> OperationResult<GetQuizStatsOutput> {
    let course_id = parse_id(&input.course_id, "CourseId")?;
    let stats = engine.quizzes().course_stats(ctx, &course_id).await?;

    Ok(stats.into())
}
