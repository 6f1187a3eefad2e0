use crate::{byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr};

/// A type that can be written to and read back from a byte stream
pub trait Serde: Sized + Clone + PartialEq {
    /// Serialize into the given writer
    fn ser(&self, writer: &mut dyn ByteWrite);

    /// Deserialize from the given reader
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` will produce for this value
    fn byte_length(&self) -> usize;
}

/// Implemented by types whose encoding always has the same size
pub trait ConstByteLength {
    fn const_byte_length() -> usize;
}
