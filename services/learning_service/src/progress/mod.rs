//! Lesson completions and the progress percentages derived from them.

pub mod repository;
pub mod tracker;
pub mod types;

pub use repository::CompletionsRepository;
pub use tracker::ProgressTracker;
pub use types::{rounded_percent, LessonCompletion, Progress};
