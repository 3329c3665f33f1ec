//! Producer library for the build assembly system
//!
//! This library produces the per-category candidate pools the optimizer works
//! on: it loads raw pools from a source, normalizes them and selects the
//! candidates worth proposing for a request.

pub mod core;
pub mod error;
pub mod producer_impl;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use error::{ProducerError, ProducerResult};
pub use producer_impl::CategoryProducer;
pub use services::*;
pub use traits::*;
pub use types::*;
