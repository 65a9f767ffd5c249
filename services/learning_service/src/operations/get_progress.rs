use service_core::EndpointError;

use crate::engine::LearningEngine;
use crate::operations::{acting_for, parse_id, OperationResult};
use crate::pb::get_progress_input::Scope;
use crate::pb::{GetProgressInput, GetProgressOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn get_progress(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: GetProgressInput,
) -> OperationResult<GetProgressOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let tracker = engine.tracker();

    let progress = match input.scope {
        Some(Scope::CourseId(course_id)) => {
            tracker
                .course_progress(&ctx, &parse_id(&course_id, "CourseId")?)
                .await?
        }
        Some(Scope::ModuleId(module_id)) => {
            tracker
                .module_progress(&ctx, &parse_id(&module_id, "ModuleId")?)
                .await?
        }
        None => return Err(EndpointError::validation("Either CourseId or ModuleId is required.")),
    };

    Ok(progress.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{course_fixture, enrolled_learner};

    #[tokio::test]
    async fn reports_course_and_module_scope() {
        let fixture = course_fixture().await;
        let ctx = enrolled_learner(&fixture).await;
        let lesson_id = fixture.m2_lessons[0].lesson_id;
        let (course_id, m2) = (fixture.course.course_id, fixture.m2.module_id);
        let engine = LearningEngine::new(fixture.store);
        engine.tracker().mark_lesson_complete(&ctx, &lesson_id, 0).await.unwrap();

        let course = get_progress(
            &engine,
            &ctx,
            GetProgressInput {
                user_id: String::new(),
                scope: Some(Scope::CourseId(course_id.to_string())),
            },
        )
        .await
        .unwrap();
        let module = get_progress(
            &engine,
            &ctx,
            GetProgressInput {
                user_id: ctx.user_id.to_string(),
                scope: Some(Scope::ModuleId(m2.to_string())),
            },
        )
        .await
        .unwrap();

        assert_eq!((1, 5, 20), (course.completed_count, course.total_count, course.percent));
        assert_eq!((1, 2, 50), (module.completed_count, module.total_count, module.percent));
    }

    #[tokio::test]
    async fn scope_is_required() {
        let fixture = course_fixture().await;
        let ctx = enrolled_learner(&fixture).await;
        let engine = LearningEngine::new(fixture.store);

        let input = GetProgressInput {
            user_id: String::new(),
            scope: None,
        };
        assert!(matches!(
            get_progress(&engine, &ctx, input).await,
            Err(EndpointError::Validation(_))
        ));
    }
}
