//! Fixed 0x30-byte CompressedBG header
//!
//! The header carries the image geometry, the cipher seed and checksums for
//! the control block, and the format version that selects a decode path.

use crate::common::{FormatVersion, PixelFormat, HEADER_SIZE, SIGNATURE};
use crate::varint::VarIntReader;
use crate::{CbgError, Result};

/// Parsed header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CbgHeader {
    /// Image width in pixels
    pub width: u16,
    /// Image height in pixels
    pub height: u16,
    /// Declared bits per pixel (8, 16, 24 or 32)
    pub bpp: u32,
    /// Length of the Huffman-decoded intermediate buffer (version 0/1)
    pub intermediate_length: u32,
    /// Keystream seed
    pub key: u32,
    /// Length of the encrypted control block
    pub enc_length: u32,
    /// Additive checksum of the decrypted control block
    pub check_sum: u8,
    /// XOR checksum of the decrypted control block
    pub check_xor: u8,
    /// Raw format version
    pub version: u16,
}

impl CbgHeader {
    /// Parse the header at the start of `data`
    ///
    /// Anything that is not a supported CompressedBG variant yields
    /// [`CbgError::UnrecognizedFormat`].
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(CbgError::UnrecognizedFormat(format!(
                "{} bytes is shorter than the header",
                data.len()
            )));
        }
        if !data.starts_with(SIGNATURE) {
            return Err(CbgError::UnrecognizedFormat("missing signature".into()));
        }

        let mut reader = VarIntReader::new(&data[0x10..HEADER_SIZE]);
        let width = reader.read_u16_le()?;
        let height = reader.read_u16_le()?;
        let bpp = reader.read_u32_le()?;
        reader.take(8)?;
        let header = Self {
            width,
            height,
            bpp,
            intermediate_length: reader.read_u32_le()?,
            key: reader.read_u32_le()?,
            enc_length: reader.read_u32_le()?,
            check_sum: reader.read_u8()?,
            check_xor: reader.read_u8()?,
            version: reader.read_u16_le()?,
        };

        header.check_supported()?;
        Ok(header)
    }

    /// Serialize back to the 0x30-byte layout
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
        out[0x10..0x12].copy_from_slice(&self.width.to_le_bytes());
        out[0x12..0x14].copy_from_slice(&self.height.to_le_bytes());
        out[0x14..0x18].copy_from_slice(&self.bpp.to_le_bytes());
        out[0x20..0x24].copy_from_slice(&self.intermediate_length.to_le_bytes());
        out[0x24..0x28].copy_from_slice(&self.key.to_le_bytes());
        out[0x28..0x2C].copy_from_slice(&self.enc_length.to_le_bytes());
        out[0x2C] = self.check_sum;
        out[0x2D] = self.check_xor;
        out[0x2E..0x30].copy_from_slice(&self.version.to_le_bytes());
        out
    }

    /// Reject version/bit-depth combinations no decode path handles
    pub fn check_supported(&self) -> Result<()> {
        let version = self.format_version()?;
        PixelFormat::from_bpp(self.bpp)?;
        if version == FormatVersion::BlockTransform && self.bpp == 16 {
            return Err(CbgError::UnrecognizedFormat(
                "16 bits per pixel is not used by version 2".into(),
            ));
        }
        Ok(())
    }

    /// Reject empty images and buffers above `max_pixels`
    pub fn validate(&self, max_pixels: usize) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CbgError::DimensionMismatch(format!(
                "{}x{} image has no pixels",
                self.width, self.height
            )));
        }
        let pixels = self.padded_width() * self.padded_height();
        if pixels > max_pixels {
            return Err(CbgError::DimensionMismatch(format!(
                "{}x{} exceeds the {max_pixels}-pixel limit",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Decode path for this header
    pub fn format_version(&self) -> Result<FormatVersion> {
        FormatVersion::from_u16(self.version)
    }

    /// Width rounded up to a multiple of 8
    pub fn padded_width(&self) -> usize {
        (self.width as usize + 7) & !7
    }

    /// Height rounded up to a multiple of 8
    pub fn padded_height(&self) -> usize {
        (self.height as usize + 7) & !7
    }

    /// Row stride of the run/predictive output
    pub fn packed_stride(&self) -> usize {
        self.width as usize * (self.bpp as usize / 8)
    }
}
