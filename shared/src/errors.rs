//! Shared error types for the build assembly system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Unknown component category: {input}")]
    UnknownCategory { input: String },

    #[error("Unknown fitness mode: {input}")]
    UnknownFitnessMode { input: String },

    #[error("Invalid budget: min {min} exceeds max {max}")]
    InvalidBudget { min: f64, max: f64 },
}

pub type SharedResult<T> = Result<T, SharedError>;
