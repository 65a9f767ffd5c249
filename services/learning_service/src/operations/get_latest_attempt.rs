use crate::engine::LearningEngine;
use crate::operations::{acting_for, parse_id, OperationResult};
use crate::pb::{GetLatestAttemptInput, GetLatestAttemptOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn get_latest_attempt(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: GetLatestAttemptInput,
) -> OperationResult<GetLatestAttemptOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let quiz_id = parse_id(&input.quiz_id, "QuizId")?;

    let attempt = engine.quizzes().latest_attempt(&ctx, &quiz_id).await?;

    Ok(GetLatestAttemptOutput {
        attempt: attempt.map(Into::into),
    })
}
