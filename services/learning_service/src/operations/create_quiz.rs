use crate::engine::LearningEngine;
use crate::operations::{parse_id, OperationResult};
use crate::pb::{CreateQuizInput, CreateQuizOutput};
use crate::quiz::NewQuiz;
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn create_quiz(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: CreateQuizInput,
) -> OperationResult<CreateQuizOutput> {
    let module_id = parse_id(&input.module_id, "ModuleId")?;
    let new_quiz = NewQuiz {
        title: Some(input.title).filter(|t| !t.trim().is_empty()),
        pass_marks: input.pass_marks,
        total_marks: input.total_marks,
    };

    let quiz = engine.quizzes().create_quiz(ctx, &module_id, new_quiz).await?;

    Ok(CreateQuizOutput {
        quiz: Some(quiz.into()),
    })
}
