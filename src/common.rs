//! Common types and constants for the CompressedBG codec
//!
//! This module defines the error type, pixel formats, format versions and the
//! fixed constants shared by both reconstruction paths.

use thiserror::Error;

/// Signature at the start of every CompressedBG blob (followed by a NUL byte)
pub const SIGNATURE: &[u8; 15] = b"CompressedBG___";

/// Size of the fixed header preceding the cipher-protected control block
pub const HEADER_SIZE: usize = 0x30;

/// Number of leaves in the byte-alphabet tree (version 0/1)
pub const BYTE_ALPHABET_SIZE: usize = 0x100;

/// Number of leaves in the DC bit-count tree (version 2)
pub const DC_ALPHABET_SIZE: usize = 0x10;

/// Number of leaves in the AC run/magnitude tree (version 2)
pub const AC_ALPHABET_SIZE: usize = 0xB0;

/// Size of the quantization prefix of a version 2 control block (two 8x8 tables)
pub const QUANT_TABLE_SIZE: usize = 0x80;

/// Default upper bound on decoded pixels (64 Mi)
pub const DEFAULT_MAX_PIXELS: usize = 64 * 1024 * 1024;

/// Pixel layout of a decoded buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit grayscale
    Gray8,
    /// 16-bit packed BGR 5:6:5, little-endian
    Bgr565,
    /// 24-bit BGR
    Bgr24,
    /// 32-bit BGR with an unused fourth byte
    Bgr32,
    /// 32-bit BGR with alpha
    Bgra32,
}

impl PixelFormat {
    /// Bits per pixel of this layout
    pub fn bits_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Gray8 => 8,
            PixelFormat::Bgr565 => 16,
            PixelFormat::Bgr24 => 24,
            PixelFormat::Bgr32 | PixelFormat::Bgra32 => 32,
        }
    }

    /// Bytes per pixel of this layout
    pub fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel() as usize / 8
    }

    /// Layout produced by the run/predictive path for a declared bit depth
    pub fn from_bpp(bpp: u32) -> Result<Self> {
        match bpp {
            8 => Ok(PixelFormat::Gray8),
            16 => Ok(PixelFormat::Bgr565),
            24 => Ok(PixelFormat::Bgr24),
            32 => Ok(PixelFormat::Bgra32),
            _ => Err(CbgError::UnrecognizedFormat(format!(
                "unsupported bits per pixel: {bpp}"
            ))),
        }
    }
}

/// Reconstruction path selected by the header's format version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// Versions 0 and 1: Huffman bytes, zero-run expansion, average prediction
    RunPredictive,
    /// Version 2: band-parallel DCT blocks with an optional alpha plane
    BlockTransform,
}

impl FormatVersion {
    /// Map a raw header version to a reconstruction path
    pub fn from_u16(value: u16) -> Result<Self> {
        match value {
            0 | 1 => Ok(FormatVersion::RunPredictive),
            2 => Ok(FormatVersion::BlockTransform),
            _ => Err(CbgError::UnrecognizedFormat(format!(
                "unsupported version: {value}"
            ))),
        }
    }
}

/// Error type for CompressedBG decoding
#[derive(Debug, Error)]
pub enum CbgError {
    /// The input is not a CompressedBG variant this crate understands
    #[error("Unrecognized format: {0}")]
    UnrecognizedFormat(String),

    /// Decrypted control block does not match the header checksums
    #[error(
        "Checksum mismatch: expected sum {expected_sum:02X} xor {expected_xor:02X}, \
         got sum {actual_sum:02X} xor {actual_xor:02X}"
    )]
    ChecksumMismatch {
        /// Additive checksum declared in the header
        expected_sum: u8,
        /// XOR checksum declared in the header
        expected_xor: u8,
        /// Additive checksum of the decrypted bytes
        actual_sum: u8,
        /// XOR checksum of the decrypted bytes
        actual_xor: u8,
    },

    /// Input ran out before a required read completed
    #[error("Truncated stream: {0}")]
    TruncatedStream(String),

    /// Huffman tree could not be built or walked
    #[error("Corrupt Huffman tree: {0}")]
    CorruptTree(String),

    /// Declared dimensions are empty or exceed the configured limit
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Structurally invalid payload (bad offsets, bad back-references)
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl CbgError {
    /// Whether a format dispatcher should move on to the next candidate decoder
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CbgError::UnrecognizedFormat(_))
    }
}

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CbgError>;
