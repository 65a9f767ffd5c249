use service_core::EndpointError;

use crate::engine::LearningEngine;
use crate::operations::{parse_id, OperationResult};
use crate::pb::get_quiz_input::Target;
use crate::pb::{GetQuizInput, GetQuizOutput, Question};
use crate::quiz::QuizTarget;
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn get_quiz(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: GetQuizInput,
) -> OperationResult<GetQuizOutput> {
    let target = match input.target {
        Some(Target::QuizId(id)) => QuizTarget::Quiz(parse_id(&id, "QuizId")?),
        Some(Target::ModuleId(id)) => QuizTarget::Module(parse_id(&id, "ModuleId")?),
        None => return Err(EndpointError::validation("Either QuizId or ModuleId is required.")),
    };

    let view = engine.quizzes().learner_quiz(ctx, target).await?;
    let quiz_id = view.quiz.quiz_id;

    Ok(GetQuizOutput {
        quiz: Some(view.quiz.into()),
        questions: view
            .questions
            .into_iter()
            .map(|q| Question::for_learner(&quiz_id, q))
            .collect(),
    })
}
