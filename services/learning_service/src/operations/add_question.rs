use crate::engine::LearningEngine;
use crate::operations::{parse_id, OperationResult};
use crate::pb::{AddQuestionInput, AddQuestionOutput};
use crate::quiz::NewQuestion;
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn add_question(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: AddQuestionInput,
) -> OperationResult<AddQuestionOutput> {
    let quiz_id = parse_id(&input.quiz_id, "QuizId")?;
    let new_question = NewQuestion {
        text: input.text,
        option_a: input.option_a,
        option_b: input.option_b,
        option_c: input.option_c,
        option_d: input.option_d,
        correct_option: input.correct_option,
    };

    let question = engine.quizzes().add_question(ctx, &quiz_id, new_question).await?;

    Ok(AddQuestionOutput {
        question: Some(question.into()),
    })
}
