//! # Path mutation
//! Applies a named write such as `Color/3` to a live value and marks the
//! dirty tree at every level it passes through.

mod engine;
mod path;

pub mod error;

pub use engine::PathMutator;
pub use path::FieldPath;
