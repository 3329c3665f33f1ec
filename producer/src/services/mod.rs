//! Candidate source implementations

pub mod json_pool;
pub mod memory_pool;

pub use json_pool::*;
pub use memory_pool::*;
