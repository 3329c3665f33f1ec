//! Core business logic modules
//!
//! Pure selection logic with no I/O dependencies.

pub mod selection;

pub use selection::*;
