//! Best-value search trait
//!
//! The cheapest search is fixed; the best-value step is pluggable so the
//! genetic and bounded searches can be swapped by configuration.

use super::types::{Deadline, SearchProblem, ValueOutcome};

/// Best-value search over an arc-consistent problem
#[mockall::automock]
pub trait ValueSearch: Send + Sync {
    fn name(&self) -> &'static str;

    /// Search for the highest-fitness valid assignment
    ///
    /// Must return the best assignment found so far once `deadline` expires,
    /// and `best: None` when no valid assignment was found.
    fn search(&self, problem: &SearchProblem, deadline: Deadline) -> ValueOutcome;
}
