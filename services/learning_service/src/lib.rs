//! Course progression and assessment engine: enrollment gating, lesson progress, module quizzes
//! and certificate eligibility, served over gRPC.

pub mod analytics;
pub mod catalog;
pub mod certification;
pub mod context;
pub mod engine;
pub mod enrollment;
pub mod error;
pub mod operations;
pub mod pb;
pub mod progress;
pub mod quiz;
pub mod request_context;
pub mod server;
pub mod store;

#[cfg(test)]
mod test_support;
