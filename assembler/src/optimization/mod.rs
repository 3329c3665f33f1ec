//! Build optimization: AC-3 reduction followed by the cheapest and
//! best-value searches
//!
//! Types, the strategy trait and the concrete strategies live in separate
//! modules; `solver` runs them as one state machine.

pub mod arc_consistency;
pub mod solver;
pub mod strategies;
pub mod traits;
pub mod types;

pub use arc_consistency::{Ac3Outcome, Ac3Status};
pub use solver::{Optimizer, SolveReport};
pub use traits::ValueSearch;
pub use types::*;
