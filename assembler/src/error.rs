//! Assembler-specific error types

use std::time::Duration;

use producer::ProducerError;
use shared::{AgentId, SharedError};
use thiserror::Error;

use crate::core::state::Section;

#[derive(Error, Debug)]
pub enum AssemblerError {
    #[error("Section {section} does not accept a {found} value")]
    SectionTypeMismatch { section: Section, found: String },

    #[error("Section {section} is per-producer and needs a producer key")]
    MissingProducer { section: Section },

    #[error("Cycle failed in {agent} during {operation}: {message}")]
    CycleFailed {
        agent: AgentId,
        operation: String,
        message: String,
    },

    #[error("Timed out after {waited:?} waiting for section {section}")]
    PollTimeout { section: Section, waited: Duration },

    #[error("Required input missing: {what}")]
    MissingInput { what: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("Producer error: {0}")]
    Producer(#[from] ProducerError),

    #[error("Worker task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl AssemblerError {
    pub fn config(field: impl Into<String>) -> Self {
        Self::ConfigurationError { field: field.into() }
    }

    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingInput { what: what.into() }
    }

    /// Short machine-readable name used in error-log entries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SectionTypeMismatch { .. } => "section_type_mismatch",
            Self::MissingProducer { .. } => "missing_producer",
            Self::CycleFailed { .. } => "cycle_failed",
            Self::PollTimeout { .. } => "poll_timeout",
            Self::MissingInput { .. } => "missing_input",
            Self::ConfigurationError { .. } => "configuration",
            Self::Shared(_) => "shared",
            Self::Producer(_) => "producer",
            Self::JoinError(_) => "join",
        }
    }
}

pub type AssemblerResult<T> = Result<T, AssemblerError>;
