//! Core coordination and checking logic
//!
//! The coordinator state and the compatibility rules are pure and
//! synchronous; `Coordinator` adds the lock and event dispatch.

pub mod compatibility;
pub mod coordinator;
pub mod packager;
pub mod state;

pub use compatibility::CompatibilityChecker;
pub use coordinator::{Coordinator, Dispatch};
pub use packager::BuildPackager;
pub use state::{
    AuditEntry, CoordinatorState, ErrorEntry, EventKind, Section, SectionKind, SectionValue,
};
