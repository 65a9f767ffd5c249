use service_core::auth::jwt::decode_bearer;
use service_core::simple_err_map;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status};
use tracing::Instrument;
use uuid::Uuid;

use crate::engine::LearningEngine;
use crate::operations::add_question::add_question;
use crate::operations::check_access::check_access;
use crate::operations::create_quiz::create_quiz;
use crate::operations::enroll::enroll;
use crate::operations::get_certificate_eligibility::get_certificate_eligibility;
use crate::operations::get_course_analytics::get_course_analytics;
use crate::operations::get_latest_attempt::get_latest_attempt;
use crate::operations::get_progress::get_progress;
use crate::operations::get_quiz::get_quiz;
use crate::operations::get_quiz_stats::get_quiz_stats;
use crate::operations::list_attempts::list_attempts;
use crate::operations::list_completed_lessons::list_completed_lessons;
use crate::operations::list_enrollments::list_enrollments;
use crate::operations::mark_lesson_complete::mark_lesson_complete;
use crate::operations::submit_quiz::submit_quiz;
use crate::pb::learning_service_server::LearningService;
use crate::pb::*;
use crate::request_context::RequestContext;
use crate::store::Store;

pub use crate::pb::learning_service_server::LearningServiceServer;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct LearningServiceImpl<S> {
    engine: LearningEngine<S>,
    jwt_secret: Vec<u8>,
}

impl<S: Store> LearningServiceImpl<S> {
    pub fn new(engine: LearningEngine<S>, jwt_secret: impl Into<Vec<u8>>) -> Self {
        LearningServiceImpl {
            engine,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Identity of the caller, from the bearer token in the request metadata.
    fn context(&self, metadata: &MetadataMap) -> Result<RequestContext, Status> {
        let request_id = metadata
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .unwrap_or_else(Uuid::new_v4);

        let header = metadata
            .get("authorization")
            .ok_or_else(|| Status::unauthenticated("Missing access token."))?
            .to_str()
            .map_err(|_| Status::unauthenticated("Malformed access token."))?;
        let claims = decode_bearer(header, &self.jwt_secret).map_err(simple_err_map!(
            "Access token rejected.",
            Status::unauthenticated("Invalid access token.")
        ))?;

        RequestContext::from_claims(request_id, &claims)
            .map_err(|_| Status::unauthenticated("Token subject is not a user ID."))
    }
}

/// Runs `$op` for the caller of `$request`.
macro_rules! serve {
    ($self:ident, $op:ident, $request:ident) => {{
        let ctx = $self.context($request.metadata())?;
        let span = tracing::info_span!(
            stringify!($op),
            request_id = %ctx.request_id,
            user_id = %ctx.user_id,
        );

        $op(&$self.engine, &ctx, $request.into_inner())
            .instrument(span)
            .await
            .map(Response::new)
            .map_err(|err| err.into())
    }};
}

#[tonic::async_trait]
impl<S: Store + 'static> LearningService for LearningServiceImpl<S> {
    async fn enroll(&self, request: Request<EnrollInput>) -> Result<Response<EnrollOutput>, Status> {
        serve!(self, enroll, request)
    }

    async fn check_access(&self, request: Request<CheckAccessInput>) -> Result<Response<CheckAccessOutput>, Status> {
        serve!(self, check_access, request)
    }

    async fn list_enrollments(
        &self,
        request: Request<ListEnrollmentsInput>,
    ) -> Result<Response<ListEnrollmentsOutput>, Status> {
        serve!(self, list_enrollments, request)
    }

    async fn mark_lesson_complete(
        &self,
        request: Request<MarkLessonCompleteInput>,
    ) -> Result<Response<MarkLessonCompleteOutput>, Status> {
        serve!(self, mark_lesson_complete, request)
    }

    async fn list_completed_lessons(
        &self,
        request: Request<ListCompletedLessonsInput>,
    ) -> Result<Response<ListCompletedLessonsOutput>, Status> {
        serve!(self, list_completed_lessons, request)
    }

    async fn get_progress(&self, request: Request<GetProgressInput>) -> Result<Response<GetProgressOutput>, Status> {
        serve!(self, get_progress, request)
    }

    async fn create_quiz(&self, request: Request<CreateQuizInput>) -> Result<Response<CreateQuizOutput>, Status> {
        serve!(self, create_quiz, request)
    }

    async fn add_question(&self, request: Request<AddQuestionInput>) -> Result<Response<AddQuestionOutput>, Status> {
        serve!(self, add_question, request)
    }

    async fn get_quiz(&self, request: Request<GetQuizInput>) -> Result<Response<GetQuizOutput>, Status> {
        serve!(self, get_quiz, request)
    }

    async fn submit_quiz(&self, request: Request<SubmitQuizInput>) -> Result<Response<SubmitQuizOutput>, Status> {
        serve!(self, submit_quiz, request)
    }

    async fn get_latest_attempt(
        &self,
        request: Request<GetLatestAttemptInput>,
    ) -> Result<Response<GetLatestAttemptOutput>, Status> {
        serve!(self, get_latest_attempt, request)
    }

    async fn list_attempts(&self, request: Request<ListAttemptsInput>) -> Result<Response<ListAttemptsOutput>, Status> {
        serve!(self, list_attempts, request)
    }

    async fn get_quiz_stats(
        &self,
        request: Request<GetQuizStatsInput>,
    ) -> Result<Response<GetQuizStatsOutput>, Status> {
        serve!(self, get_quiz_stats, request)
    }

    async fn get_course_analytics(
        &self,
        request: Request<GetCourseAnalyticsInput>,
    ) -> Result<Response<GetCourseAnalyticsOutput>, Status> {
        serve!(self, get_course_analytics, request)
    }

    async fn get_certificate_eligibility(
        &self,
        request: Request<GetCertificateEligibilityInput>,
    ) -> Result<Response<GetCertificateEligibilityOutput>, Status> {
        serve!(self, get_certificate_eligibility, request)
    }
}
