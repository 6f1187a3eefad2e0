use thiserror::Error;

/// Errors raised while reading primitives out of a byte buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran past the end of its buffer
    #[error("Unexpected end of buffer: needed {needed} byte(s), {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A boolean was encoded with a byte other than 0 or 1
    #[error("Invalid boolean byte {byte:#04x}")]
    InvalidBool { byte: u8 },
}
