use crate::error::SerdeErr;

/// Cursor over an incoming byte buffer
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    index: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, index: 0 }
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let Some(byte) = self.buffer.get(self.index) else {
            return Err(SerdeErr::UnexpectedEnd {
                needed: 1,
                remaining: 0,
            });
        };
        self.index += 1;
        Ok(*byte)
    }

    /// Borrows the next `count` bytes and advances past them
    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], SerdeErr> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(SerdeErr::UnexpectedEnd {
                needed: count,
                remaining,
            });
        }
        let bytes = &self.buffer[self.index..self.index + count];
        self.index += count;
        Ok(bytes)
    }

    /// Reads exactly `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let bytes = self.read_bytes(N)?;
        let mut output = [0u8; N];
        output.copy_from_slice(bytes);
        Ok(output)
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.index
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
