//! Enrollment records and the gate deciding who may use a course.

pub mod gate;
pub mod repository;
pub mod types;

pub use gate::{Access, EnrollOutcome, EnrollmentGate};
pub use repository::EnrollmentsRepository;
pub use types::Enrollment;
