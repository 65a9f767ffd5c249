use std::fmt::{Display, Formatter};

use service_core::operation_error::OperationError;
use thiserror::Error;
use tonic::Code;
use uuid::Uuid;

use crate::store::RepositoryError;

/// Kinds of records an operation can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Course,
    Module,
    Lesson,
    Quiz,
    Question,
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} {1} not found.")]
    NotFound(Entity, Uuid),

    #[error("{0} already exists.")]
    AlreadyExists(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("{0}")]
    Validation(String),

    #[error("Conflicting write on {0}.")]
    Conflict(String),

    #[error(transparent)]
    Datastore(#[from] RepositoryError),
}

impl EngineError {
    pub fn not_enrolled(course_id: &Uuid) -> Self {
        EngineError::AccessDenied(format!("not enrolled in course {}", course_id))
    }

    pub fn admin_only() -> Self {
        EngineError::AccessDenied("administrator role required".to_owned())
    }
}

impl OperationError for EngineError {
    fn code(&self) -> Code {
        match self {
            Self::NotFound(..) => Code::NotFound,
            Self::AlreadyExists(_) => Code::AlreadyExists,
            Self::AccessDenied(_) => Code::PermissionDenied,
            Self::Validation(_) => Code::InvalidArgument,
            Self::Conflict(_) => Code::Aborted,
            Self::Datastore(_) => Code::Internal,
        }
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
