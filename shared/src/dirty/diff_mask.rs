use super::error::DiffMaskError;

/// Fixed-size bitset packed least-significant-bit first into bytes.
///
/// The packed form is exactly what goes on the wire: `ceil(bit_count / 8)`
/// bytes, with padding bits in the last byte always zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffMask {
    bit_count: usize,
    mask: Vec<u8>,
}

impl DiffMask {
    pub fn new(bit_count: usize) -> Self {
        Self {
            bit_count,
            mask: vec![0; Self::byte_count_for(bit_count)],
        }
    }

    /// Bytes needed to pack `bit_count` bits
    pub fn byte_count_for(bit_count: usize) -> usize {
        bit_count.div_ceil(8)
    }

    /// Rebuilds a mask from its packed form. Padding bits are ignored.
    pub fn from_bytes(bit_count: usize, bytes: &[u8]) -> Result<Self, DiffMaskError> {
        let expected = Self::byte_count_for(bit_count);
        if bytes.len() != expected {
            return Err(DiffMaskError::ByteCountMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        let mut output = Self {
            bit_count,
            mask: bytes.to_vec(),
        };
        output.clear_padding();
        Ok(output)
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn byte_count(&self) -> usize {
        self.mask.len()
    }

    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.bit_count {
            return None;
        }
        Some(self.mask[index / 8] & (1 << (index % 8)) != 0)
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range. Use `try_set_bit` to get an error instead.
    pub fn set_bit(&mut self, index: usize, value: bool) {
        if let Err(error) = self.try_set_bit(index, value) {
            panic!("{}", error);
        }
    }

    pub fn try_set_bit(&mut self, index: usize, value: bool) -> Result<(), DiffMaskError> {
        if index >= self.bit_count {
            return Err(DiffMaskError::BitOutOfRange {
                index,
                bit_count: self.bit_count,
            });
        }
        let byte = &mut self.mask[index / 8];
        if value {
            *byte |= 1 << (index % 8);
        } else {
            *byte &= !(1 << (index % 8));
        }
        Ok(())
    }

    pub fn set_all(&mut self) {
        self.mask.fill(u8::MAX);
        self.clear_padding();
    }

    pub fn clear(&mut self) {
        self.mask.fill(0);
    }

    pub fn is_clear(&self) -> bool {
        self.mask.iter().all(|byte| *byte == 0)
    }

    pub fn count_ones(&self) -> usize {
        self.mask
            .iter()
            .map(|byte| byte.count_ones() as usize)
            .sum()
    }

    /// Fraction of bits set, in `[0, 1]`. An empty mask has ratio 0.
    pub fn ratio(&self) -> f32 {
        if self.bit_count == 0 {
            return 0.0;
        }
        self.count_ones() as f32 / self.bit_count as f32
    }

    /// Indices of set bits, ascending
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.bit_count).filter(|index| self.bit(*index) == Some(true))
    }

    pub fn or(&mut self, other: &DiffMask) {
        for (byte, other_byte) in self.mask.iter_mut().zip(other.mask.iter()) {
            *byte |= *other_byte;
        }
        self.clear_padding();
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.mask
    }

    fn clear_padding(&mut self) {
        let used = self.bit_count % 8;
        if used != 0 {
            if let Some(last) = self.mask.last_mut() {
                *last &= (1u8 << used) - 1;
            }
        }
    }
}
