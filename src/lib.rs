//! cbglib - Rust decoder for CompressedBG images
//!
//! This crate decodes the `CompressedBG___` still-image format embedded in
//! visual-novel resource archives. A blob carries a fixed header, a control
//! block obscured by a keyed keystream, and a Huffman-coded payload that is
//! reconstructed through one of two paths:
//!
//! - **Versions 0/1** - byte-alphabet Huffman decoding, zero-run expansion and
//!   reverse average prediction. Output is 8, 16, 24 or 32 bits per pixel.
//! - **Version 2** - per-band DC/AC coefficient decoding, dequantization,
//!   floating-point inverse DCT and YCbCr conversion, with bands decoded in
//!   parallel and an optional alpha plane. Output is 32 bits per pixel.
//!
//! # Example
//!
//! ```no_run
//! use cbglib::{decode_bytes, CbgDecoder, DecodeOptions, Scheduling};
//!
//! let data = std::fs::read("image.cbg")?;
//! let image = decode_bytes(&data)?;
//! println!("{}x{} {:?}, stride {}", image.width, image.height, image.format, image.stride);
//!
//! // Single-threaded decoding with a pixel limit
//! let decoder = CbgDecoder::new(
//!     DecodeOptions::new()
//!         .with_scheduling(Scheduling::Sequential)
//!         .with_max_pixels(4096 * 4096),
//! );
//! let image = decoder.decode(&data)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod bits;
pub mod cipher;
pub mod common;
pub mod decoder;
pub mod error;
pub mod header;
pub mod huffman;
pub mod image;
pub mod predictive;
pub mod tables;
pub mod transform;
pub mod varint;

// Re-export commonly used types
pub use bits::BitReader;
pub use cipher::KeyedByteCipher;
pub use common::{
    CbgError, FormatVersion, PixelFormat, Result, DEFAULT_MAX_PIXELS, HEADER_SIZE, SIGNATURE,
};
pub use decoder::{CbgDecoder, DecodeOptions};
pub use header::CbgHeader;
pub use huffman::{HuffmanTree, TreeVariant};
pub use image::DecodedImage;
pub use transform::Scheduling;
pub use varint::VarIntReader;

// Convenience functions

/// Decode a complete CompressedBG blob with default options
///
/// # Arguments
/// * `data` - The blob, starting with the 0x30-byte header
///
/// # Returns
/// The decoded pixel buffer, its stride and pixel format
pub fn decode_bytes(data: &[u8]) -> Result<DecodedImage> {
    CbgDecoder::default().decode(data)
}

/// Decode a blob, returning `Ok(None)` when it is not a CompressedBG image
///
/// Lets archive-level format probing continue with the next candidate.
pub fn try_decode_bytes(data: &[u8]) -> Result<Option<DecodedImage>> {
    CbgDecoder::default().try_decode(data)
}
