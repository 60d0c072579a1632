//! Byte-level reader with 7-bit continuation integers
//!
//! Weight tables, band coefficient counts and zero-run lengths are all stored
//! as little-endian groups of 7 bits, the high bit of each byte flagging that
//! another group follows.

use crate::{CbgError, Result};

/// Maximum shift before a varint is considered malformed
const MAX_VARINT_SHIFT: u32 = 32;

/// Cursor over a byte slice
#[derive(Debug, Clone)]
pub struct VarIntReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> VarIntReader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| CbgError::TruncatedStream(format!("byte at {}", self.pos)))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read a little-endian 16-bit word
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian 32-bit word
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Borrow the next `count` bytes
    pub fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                CbgError::TruncatedStream(format!("{count} bytes at {}", self.pos))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read a 7-bit continuation integer
    pub fn read_varint(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0u32;
        loop {
            let code = self.read_u8()?;
            if shift >= MAX_VARINT_SHIFT {
                return Err(CbgError::CorruptData(format!(
                    "varint longer than 32 bits at {}",
                    self.pos - 1
                )));
            }
            value |= ((code & 0x7F) as u32) << shift;
            shift += 7;
            if code & 0x80 == 0 {
                return Ok(value);
            }
        }
    }

    /// Read `count` varint weights
    pub fn read_weight_table(&mut self, count: usize) -> Result<Vec<u32>> {
        (0..count).map(|_| self.read_varint()).collect()
    }
}
