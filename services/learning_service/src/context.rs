use core::fmt;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::store::DdbTables;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKey {
    ListenAddr,
    StorageBackend,
    CatalogSeedPath,
    JwtSecret,
    DynamoDbEndpoint,
    CoursesTableName,
    ModulesTableName,
    LessonsTableName,
    EnrollmentsTableName,
    CompletionsTableName,
    QuizzesTableName,
    QuestionsTableName,
    AttemptsTableName,
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::ListenAddr => "LISTEN_ADDR",
            Self::StorageBackend => "STORAGE_BACKEND",
            Self::CatalogSeedPath => "CATALOG_SEED_PATH",
            Self::JwtSecret => "JWT_SECRET",
            Self::DynamoDbEndpoint => "DYNAMODB_ENDPOINT",
            Self::CoursesTableName => "COURSES_TABLE_NAME",
            Self::ModulesTableName => "MODULES_TABLE_NAME",
            Self::LessonsTableName => "LESSONS_TABLE_NAME",
            Self::EnrollmentsTableName => "ENROLLMENTS_TABLE_NAME",
            Self::CompletionsTableName => "COMPLETIONS_TABLE_NAME",
            Self::QuizzesTableName => "QUIZZES_TABLE_NAME",
            Self::QuestionsTableName => "QUESTIONS_TABLE_NAME",
            Self::AttemptsTableName => "ATTEMPTS_TABLE_NAME",
        };

        write!(f, "{}", name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("Environment variable {0} is required.")]
    Missing(ContextKey),

    #[error("Environment variable {key} has an invalid value {value:?}.")]
    Invalid { key: ContextKey, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    DynamoDb,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "dynamodb" => Ok(StorageBackend::DynamoDb),
            _ => Err(()),
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Context {
    pub listen_addr: SocketAddr,
    pub backend: StorageBackend,
    pub catalog_seed_path: Option<PathBuf>,
    pub jwt_secret: String,
    pub dynamodb_endpoint: Option<String>,
    /// Set when the backend is DynamoDB.
    pub tables: Option<DdbTables>,
}

impl Context {
    pub fn from_env() -> Result<Self, ContextError> {
        Context::from_lookup(|key| env::var(key.to_string()).ok())
    }

    /// Same as [`Context::from_env`] with variables read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(ContextKey) -> Option<String>) -> Result<Self, ContextError> {
        let optional = |key: ContextKey| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: ContextKey| optional(key).ok_or(ContextError::Missing(key));

        let listen_addr = optional(ContextKey::ListenAddr).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let listen_addr = listen_addr.parse().map_err(|_| ContextError::Invalid {
            key: ContextKey::ListenAddr,
            value: listen_addr.clone(),
        })?;

        let backend = match optional(ContextKey::StorageBackend) {
            Some(value) => value.parse().map_err(|_| ContextError::Invalid {
                key: ContextKey::StorageBackend,
                value,
            })?,
            None => StorageBackend::Memory,
        };

        let tables = match backend {
            StorageBackend::Memory => None,
            StorageBackend::DynamoDb => Some(DdbTables {
                courses: required(ContextKey::CoursesTableName)?,
                modules: required(ContextKey::ModulesTableName)?,
                lessons: required(ContextKey::LessonsTableName)?,
                enrollments: required(ContextKey::EnrollmentsTableName)?,
                completions: required(ContextKey::CompletionsTableName)?,
                quizzes: required(ContextKey::QuizzesTableName)?,
                questions: required(ContextKey::QuestionsTableName)?,
                attempts: required(ContextKey::AttemptsTableName)?,
            }),
        };

        Ok(Context {
            listen_addr,
            backend,
            catalog_seed_path: optional(ContextKey::CatalogSeedPath).map(PathBuf::from),
            jwt_secret: required(ContextKey::JwtSecret)?,
            dynamodb_endpoint: optional(ContextKey::DynamoDbEndpoint),
            tables,
        })
    }
}
