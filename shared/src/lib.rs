//! Shared types for the build assembly system
//!
//! Contains the data model exchanged between candidate producers, the
//! coordinator, the compatibility checker and the optimizer, plus the
//! logging helpers every crate uses.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
