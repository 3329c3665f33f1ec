//! Build assembly library
//!
//! Coordinates per-category candidate producers, a pairwise compatibility
//! checker and a constraint optimizer around a shared, lock-protected
//! coordinator, producing labeled PC builds within a budget.

pub mod assembler;
pub mod config;
pub mod core;
pub mod error;
pub mod optimization;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use assembler::{Assembler, AssemblyOutcome};
pub use config::{AssemblerConfig, GeneticConfig, PollConfig, SearchConfig, ValueStrategy};
pub use core::{
    BuildPackager, CompatibilityChecker, Coordinator, Dispatch, EventKind, Section, SectionValue,
};
pub use error::{AssemblerError, AssemblerResult};
pub use optimization::{Optimizer, SolveReport};
pub use traits::{CompatibilityRule, Subscriber};
