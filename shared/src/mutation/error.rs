use thiserror::Error;

use crate::{dirty::error::DiffMaskError, schema::error::SchemaError};

/// A mutation that did not apply. The value and its dirty tree are left as
/// they were, so the caller may correct the request and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("Mutation path is empty")]
    EmptyPath,

    #[error("Unknown field {field} in {type_name}")]
    UnknownField {
        field: String,
        type_name: &'static str,
    },

    #[error("Index {index} out of bounds for collection of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    /// An empty segment, or a collection index that is not a number
    #[error("Invalid path segment '{segment}'")]
    InvalidPathSegment { segment: String },

    /// The path continues past a leaf or an array element
    #[error("Path continues after {field}")]
    TrailingSegments { field: String },

    #[error("Value for {field} should be {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Writes inside struct elements of a collection are not tracked
    #[error("Element writes into {field} are not supported, replace the collection instead")]
    Unsupported { field: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    DiffMask(#[from] DiffMaskError),
}
