//! Run/predictive reconstruction (format versions 0 and 1)
//!
//! The body holds an encrypted 256-entry weight table followed by a Huffman
//! bit stream. Decoded bytes form an intermediate buffer of alternating
//! literal and zero runs, which expands into per-channel deltas that are
//! finally resolved by neighbour-average prediction. Every step depends on
//! bytes written before it, so this path is strictly sequential.

mod expand;
mod sampling;

pub use expand::expand_zero_runs;
pub use sampling::reverse_average_sampling;

use crate::bits::BitReader;
use crate::cipher::read_control_block;
use crate::common::{PixelFormat, BYTE_ALPHABET_SIZE};
use crate::header::CbgHeader;
use crate::huffman::{HuffmanTree, TreeVariant};
use crate::image::DecodedImage;
use crate::varint::VarIntReader;
use crate::Result;

/// Decode a version 0/1 body (everything after the fixed header)
pub fn decode(header: &CbgHeader, body: &[u8]) -> Result<DecodedImage> {
    let format = PixelFormat::from_bpp(header.bpp)?;
    let control = read_control_block(header, body)?;
    let weights = VarIntReader::new(&control).read_weight_table(BYTE_ALPHABET_SIZE)?;
    let tree = HuffmanTree::new(&weights, TreeVariant::FullScan)?;

    let mut bits = BitReader::new(&body[header.enc_length as usize..]);
    let intermediate = (0..header.intermediate_length)
        .map(|_| tree.decode_token(&mut bits).map(|symbol| symbol as u8))
        .collect::<Result<Vec<u8>>>()?;
    log::trace!(
        "huffman stage produced {} bytes from {} input bytes",
        intermediate.len(),
        bits.byte_position()
    );

    let stride = header.packed_stride();
    let mut pixels = vec![0u8; stride * header.height as usize];
    expand_zero_runs(&intermediate, &mut pixels);
    reverse_average_sampling(
        &mut pixels,
        header.width as usize,
        header.height as usize,
        format.bytes_per_pixel(),
    );

    Ok(DecodedImage {
        width: header.width as u32,
        height: header.height as u32,
        stride,
        format,
        pixels,
    })
}
