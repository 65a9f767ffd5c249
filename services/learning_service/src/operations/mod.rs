//! One function per RPC. Each parses its input, runs the engine on behalf of the caller and
//! converts the result to the wire types.

pub mod add_question;
pub mod check_access;
pub mod create_quiz;
pub mod enroll;
pub mod get_certificate_eligibility;
pub mod get_course_analytics;
pub mod get_latest_attempt;
pub mod get_progress;
pub mod get_quiz;
pub mod get_quiz_stats;
pub mod list_attempts;
pub mod list_completed_lessons;
pub mod list_enrollments;
pub mod mark_lesson_complete;
pub mod submit_quiz;

use service_core::EndpointError;
use uuid::Uuid;

use crate::error::EngineError;
use crate::request_context::RequestContext;

pub type OperationResult<T> = Result<T, EndpointError<EngineError>>;

impl From<EngineError> for EndpointError<EngineError> {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => EndpointError::validation(msg),
            EngineError::Datastore(e) => {
                tracing::error!(error = ?e, "Datastore call failed.");
                EndpointError::internal()
            }
            other => EndpointError::operation(other),
        }
    }
}

pub(crate) fn parse_id(value: &str, field: &str) -> Result<Uuid, EndpointError<EngineError>> {
    Uuid::parse_str(value.trim()).map_err(|_| EndpointError::validation(format!("{} is not a valid ID.", field)))
}

/// Context for the user named in the input. Empty means the caller.
pub(crate) fn acting_for(ctx: &RequestContext, user_id: &str) -> OperationResult<RequestContext> {
    let user_id = if user_id.trim().is_empty() {
        None
    } else {
        Some(parse_id(user_id, "UserId")?)
    };

    Ok(ctx.acting_for(user_id)?)
}
