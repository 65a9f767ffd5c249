use service_core::auth::{Claims, Role};
use uuid::Uuid;

use crate::error::EngineError;

/// Identity of the caller for the duration of one request. Every engine operation receives it
/// explicitly; nothing about the caller is kept between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
}

impl RequestContext {
    pub fn new(request_id: Uuid, user_id: Uuid, role: Role) -> Self {
        RequestContext {
            request_id,
            user_id,
            role,
        }
    }

    /// Builds the context from verified access token claims. The subject must be a user ID.
    pub fn from_claims(request_id: Uuid, claims: &Claims) -> Result<Self, EngineError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| EngineError::Validation("Token subject is not a user ID.".to_owned()))?;

        Ok(RequestContext::new(request_id, user_id, claims.role))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), EngineError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(EngineError::admin_only())
        }
    }

    /// Context for acting on behalf of `user_id`. Learners may only act for themselves, while
    /// administrators may act for anyone.
    pub fn acting_for(&self, user_id: Option<Uuid>) -> Result<RequestContext, EngineError> {
        match user_id {
            None => Ok(self.clone()),
            Some(user_id) if user_id == self.user_id => Ok(self.clone()),
            Some(user_id) if self.is_admin() => Ok(RequestContext {
                user_id,
                ..self.clone()
            }),
            Some(_) => Err(EngineError::AccessDenied("cannot act on behalf of another user".to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn learner() -> RequestContext {
        RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), Role::Learner)
    }

    #[test]
    fn learner_acts_for_self_only() {
        let ctx = learner();

        assert_eq!(ctx, ctx.acting_for(None).unwrap());
        assert_eq!(ctx, ctx.acting_for(Some(ctx.user_id)).unwrap());
        assert!(matches!(
            ctx.acting_for(Some(Uuid::new_v4())),
            Err(EngineError::AccessDenied(_))
        ));
    }

    #[test]
    fn admin_acts_for_anyone() {
        let admin = RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), Role::Admin);
        let other = Uuid::new_v4();

        let ctx = admin.acting_for(Some(other)).unwrap();
        assert_eq!(other, ctx.user_id);
        assert_eq!(admin.request_id, ctx.request_id);
    }

    #[test]
    fn rejects_non_uuid_subject() {
        let claims = Claims {
            sub: "not-a-uuid".to_owned(),
            email: "a@example.com".to_owned(),
            first_name: "A".to_owned(),
            last_name: "B".to_owned(),
            role: Role::Learner,
            exp: 0,
        };

        assert!(RequestContext::from_claims(Uuid::new_v4(), &claims).is_err());
    }
}
