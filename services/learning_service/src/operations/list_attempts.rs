use crate::engine::LearningEngine;
use crate::operations::{acting_for, parse_id, OperationResult};
use crate::pb::{ListAttemptsInput, ListAttemptsOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn list_attempts(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: ListAttemptsInput,
) -> OperationResult<ListAttemptsOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let quiz_id = parse_id(&input.quiz_id, "QuizId")?;

    let attempts = engine.quizzes().attempt_history(&ctx, &quiz_id).await?;

    Ok(ListAttemptsOutput {
        attempts: attempts.into_iter().map(Into::into).collect(),
    })
}
