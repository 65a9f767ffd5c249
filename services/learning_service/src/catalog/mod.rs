//! Course content as authored elsewhere. This service only reads it.

pub mod repository;
pub mod seed;
pub mod types;

pub use repository::{course_outline, CatalogRepository, CourseOutline, ModuleOutline};
pub use seed::CatalogSeed;
pub use types::{Course, Lesson, Module};
