use crate::{
    byte_reader::ByteReader, byte_writer::ByteWrite, error::SerdeErr, serde::Serde,
    ConstByteLength,
};

// Numbers

macro_rules! impl_serde_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Serde for $ty {
                fn ser(&self, writer: &mut dyn ByteWrite) {
                    writer.write_bytes(&self.to_le_bytes());
                }

                fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                    let bytes = reader.read_array::<{ std::mem::size_of::<$ty>() }>()?;
                    Ok(<$ty>::from_le_bytes(bytes))
                }

                fn byte_length(&self) -> usize {
                    <Self as ConstByteLength>::const_byte_length()
                }
            }

            impl ConstByteLength for $ty {
                fn const_byte_length() -> usize {
                    std::mem::size_of::<$ty>()
                }
            }
        )*
    };
}

impl_serde_number!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

// Bool

impl Serde for bool {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(SerdeErr::InvalidBool { byte }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl ConstByteLength for bool {
    fn const_byte_length() -> usize {
        1
    }
}
