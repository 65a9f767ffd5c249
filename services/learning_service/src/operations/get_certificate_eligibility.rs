use crate::engine::LearningEngine;
use crate::operations::{acting_for, parse_id, OperationResult};
use crate::pb::{GetCertificateEligibilityInput, GetCertificateEligibilityOutput};
use crate::request_context::RequestContext;
use crate::store::Store;

pub(crate) async fn get_certificate_eligibility(
    engine: &LearningEngine<impl Store>,
    ctx: &RequestContext,
    input: GetCertificateEligibilityInput,
) -> OperationResult<GetCertificateEligibilityOutput> {
    let ctx = acting_for(ctx, &input.user_id)?;
    let course_id = parse_id(&input.course_id, "CourseId")?;

    let report = engine.certification().explain_eligibility(&ctx, &course_id).await?;

    Ok(report.into())
}
