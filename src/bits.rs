//! MSB-first bit reader
//!
//! Bytes are pulled into a small cache one at a time and bits are consumed
//! from the most significant end.

use crate::{CbgError, Result};

/// Bit reader over a byte slice
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    cache: u32,
    cached_bits: u32,
}

impl<'a> BitReader<'a> {
    /// Create a reader at the first bit of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            cache: 0,
            cached_bits: 0,
        }
    }

    /// Read a single bit
    pub fn get_bit(&mut self) -> Result<bool> {
        Ok(self.get_bits(1)? != 0)
    }

    /// Read `count` bits (at most 24) as an unsigned value
    pub fn get_bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 24);
        if count == 0 {
            return Ok(0);
        }
        while self.cached_bits < count {
            let byte = *self.data.get(self.pos).ok_or_else(|| {
                CbgError::TruncatedStream(format!(
                    "needed {count} bits at byte {}",
                    self.pos
                ))
            })?;
            self.pos += 1;
            self.cache = (self.cache << 8) | byte as u32;
            self.cached_bits += 8;
        }
        self.cached_bits -= count;
        Ok((self.cache >> self.cached_bits) & ((1 << count) - 1))
    }

    /// Discard the unread bits of the current byte
    pub fn align_to_byte(&mut self) {
        self.cached_bits -= self.cached_bits & 7;
    }

    /// Whether every input byte has been pulled into the cache
    ///
    /// Cached bits may still be pending when this returns true.
    pub fn bytes_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Number of bytes pulled from the input so far
    pub fn byte_position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first() {
        let mut reader = BitReader::new(&[0b1010_0000, 0xFF]);
        assert!(reader.get_bit().unwrap());
        assert!(!reader.get_bit().unwrap());
        assert!(reader.get_bit().unwrap());
        assert_eq!(reader.get_bits(5).unwrap(), 0);
        assert_eq!(reader.get_bits(8).unwrap(), 0xFF);
        assert!(reader.bytes_exhausted());
        assert!(matches!(reader.get_bit(), Err(CbgError::TruncatedStream(_))));
    }

    #[test]
    fn test_bits_span_bytes() {
        let mut reader = BitReader::new(&[0x12, 0x34, 0x56]);
        assert_eq!(reader.get_bits(4).unwrap(), 0x1);
        assert_eq!(reader.get_bits(12).unwrap(), 0x234);
        assert_eq!(reader.get_bits(8).unwrap(), 0x56);
    }

    #[test]
    fn test_align_discards_partial_byte() {
        let mut reader = BitReader::new(&[0xFF, 0x5A]);
        assert_eq!(reader.get_bits(3).unwrap(), 0b111);
        reader.align_to_byte();
        assert_eq!(reader.get_bits(8).unwrap(), 0x5A);

        // aligning an already aligned reader is a no-op
        reader.align_to_byte();
        assert!(reader.get_bit().is_err());
    }

    #[test]
    fn test_zero_width_read() {
        let mut reader = BitReader::new(&[]);
        assert_eq!(reader.get_bits(0).unwrap(), 0);
        assert!(reader.bytes_exhausted());
    }
}
