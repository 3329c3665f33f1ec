//! Producer error types

use shared::{Category, SharedError};
use thiserror::Error;

/// Result type for producer operations
pub type ProducerResult<T> = Result<T, ProducerError>;

/// Producer error types
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Candidate pool not found for {category}: {path}")]
    PoolNotFound { category: Category, path: String },

    #[error("Malformed candidate pool for {category}: {message}")]
    MalformedPool { category: Category, message: String },

    #[error("Candidate source failed for {category}: {message}")]
    SourceError { category: Category, message: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
