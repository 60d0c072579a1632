//! Keyed keystream cipher for the control block
//!
//! The control block following the fixed header is obscured by subtracting a
//! keystream derived from the header key. After decryption an additive and an
//! XOR checksum over the plain bytes must match the header.

use crate::header::CbgHeader;
use crate::{CbgError, Result};

/// Deterministic keystream generator
#[derive(Debug, Clone)]
pub struct KeyedByteCipher {
    key: u32,
    magic: u32,
}

impl KeyedByteCipher {
    /// Create a cipher with the default (zero) magic word
    pub fn new(key: u32) -> Self {
        Self::with_magic(key, 0)
    }

    /// Create a cipher with an explicit 16-bit magic constant
    ///
    /// The constant occupies the high half of the magic word; the low half is
    /// always zero.
    pub fn with_magic(key: u32, magic: u16) -> Self {
        Self {
            key,
            magic: (magic as u32) << 16,
        }
    }

    /// Advance the key and return the next keystream byte
    pub fn next_byte(&mut self) -> u8 {
        let v0 = 20021 * (self.key & 0xFFFF);
        let mut v1 = self.magic | (self.key >> 16);
        v1 = v1
            .wrapping_mul(20021)
            .wrapping_add(self.key.wrapping_mul(346));
        v1 = (v1.wrapping_add(v0 >> 16)) & 0xFFFF;
        self.key = (v1 << 16).wrapping_add(v0 & 0xFFFF).wrapping_add(1);
        v1 as u8
    }

    /// Decrypt a buffer in place and return its (sum, xor) checksums
    pub fn decrypt(&mut self, buf: &mut [u8]) -> (u8, u8) {
        let mut sum = 0u8;
        let mut xor = 0u8;
        for byte in buf.iter_mut() {
            *byte = byte.wrapping_sub(self.next_byte());
            sum = sum.wrapping_add(*byte);
            xor ^= *byte;
        }
        (sum, xor)
    }
}

/// Decrypt the control block at the start of `body` and verify its checksums
pub fn read_control_block(header: &CbgHeader, body: &[u8]) -> Result<Vec<u8>> {
    let length = header.enc_length as usize;
    let encrypted = body.get(..length).ok_or_else(|| {
        CbgError::TruncatedStream(format!(
            "control block needs {length} bytes, body has {}",
            body.len()
        ))
    })?;

    let mut block = encrypted.to_vec();
    let (sum, xor) = KeyedByteCipher::new(header.key).decrypt(&mut block);
    if sum != header.check_sum || xor != header.check_xor {
        return Err(CbgError::ChecksumMismatch {
            expected_sum: header.check_sum,
            expected_xor: header.check_xor,
            actual_sum: sum,
            actual_xor: xor,
        });
    }

    log::trace!("decrypted {length}-byte control block");
    Ok(block)
}
