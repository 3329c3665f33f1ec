//! Search strategies
//!
//! `cheapest` is the fixed deterministic step; `genetic` and `bounded`
//! implement `ValueSearch` for the best-value step.

pub mod bounded;
pub mod cheapest;
pub mod genetic;

pub use bounded::BoundedSearch;
pub use cheapest::CheapestOutcome;
pub use genetic::GeneticSearch;
