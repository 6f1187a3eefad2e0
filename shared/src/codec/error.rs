use thiserror::Error;

use deltasync_serde::SerdeErr;

use crate::{dirty::error::DiffMaskError, schema::error::SchemaError};

/// Errors that abort one encode or decode. A frame that fails to decode is
/// discarded whole; resynchronizing the peer is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The frame's type id matches no registered sync type
    #[error("Unknown sync type id {id}")]
    UnknownTypeId { id: u8 },

    /// The frame's type id is valid but not the type being decoded into
    #[error("Frame carries sync type id {found}, expected {expected}")]
    TypeIdMismatch { expected: u8, found: u8 },

    /// A value does not have the shape its schema declares
    #[error("Value of field {field} does not match its schema: expected {expected}, found {found}")]
    ValueMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A collection length prefix below -1, or -1 for a list
    #[error("Invalid length prefix {length} for field {field}")]
    NegativeLength { field: &'static str, length: i32 },

    /// A collection too long for the i32 length prefix
    #[error("Field {field} holds {length} elements, more than a frame can describe")]
    LengthOverflow { field: &'static str, length: usize },

    /// A mode byte other than the ones the format defines
    #[error("Invalid {context} mode byte {byte}")]
    InvalidMode { context: &'static str, byte: u8 },

    /// The dirty tree handed in was not built from the value's schema
    #[error("Dirty flags do not match the schema of {type_name}")]
    DirtyShapeMismatch { type_name: &'static str },

    /// Bytes left over after a complete frame was read
    #[error("{remaining} trailing byte(s) after frame")]
    TrailingBytes { remaining: usize },

    #[error(transparent)]
    Serde(#[from] SerdeErr),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    DiffMask(#[from] DiffMaskError),
}
