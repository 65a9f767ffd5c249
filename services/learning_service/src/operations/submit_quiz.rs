use crate::engine::LearningEngine;
use crate::operations::{acting_for, parse_id, OperationResult};
use crate::pb::{SubmitQuizInput, SubmitQuizOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn submit_quiz(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: SubmitQuizInput,
) -> OperationResult<SubmitQuizOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let quiz_id = parse_id(&input.quiz_id, "QuizId")?;

    let result = engine.quizzes().submit_attempt(&ctx, &quiz_id, input.answers).await?;

    Ok(SubmitQuizOutput {
        attempt_id: result.attempt_id.to_string(),
        score: result.score,
        total_questions: result.total_questions,
        passed: result.passed,
    })
}
