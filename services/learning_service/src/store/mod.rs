//! Storage backends. Each uniqueness rule of the data model is a key of the backing store, so a
//! duplicate write is rejected by the store itself and reported as [`RepositoryError::Duplicate`].

pub mod ddb;
pub mod memory;

use std::error::Error;

use thiserror::Error;

pub use ddb::{DdbStore, DdbTables};
pub use memory::MemoryStore;

use crate::catalog::CatalogRepository;
use crate::enrollment::EnrollmentsRepository;
use crate::progress::CompletionsRepository;
use crate::quiz::{AttemptsRepository, QuizzesRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Unique constraint violated: {0}.")]
    Duplicate(&'static str),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

/// Everything the engine reads and writes.
pub trait Store:
    CatalogRepository + EnrollmentsRepository + CompletionsRepository + QuizzesRepository + AttemptsRepository
{
}

impl<T> Store for T where
    T: CatalogRepository + EnrollmentsRepository + CompletionsRepository + QuizzesRepository + AttemptsRepository
{
}
