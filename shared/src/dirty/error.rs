use thiserror::Error;

/// Errors raised by dirty bitsets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffMaskError {
    #[error("Bit {index} is out of range for a mask of {bit_count} bit(s)")]
    BitOutOfRange { index: usize, bit_count: usize },

    #[error("Packed mask needs {expected} byte(s), got {actual}")]
    ByteCountMismatch { expected: usize, actual: usize },
}
