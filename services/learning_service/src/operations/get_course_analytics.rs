use crate::engine::LearningEngine;
use crate::operations::{parse_id, OperationResult};
use crate::pb::{GetCourseAnalyticsInput, GetCourseAnalyticsOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn get_course_analytics(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: GetCourseAnalyticsInput,
) -> OperationResult<GetCourseAnalyticsOutput> {
    let course_id = parse_id(&input.course_id, "CourseId")?;
    let analytics = engine.reporter().course_analytics(ctx, &course_id).await?;

    Ok(analytics.into())
}
