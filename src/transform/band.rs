//! Per-band coefficient decoding and pixel reconstruction
//!
//! A band is 8 pixel rows. Its payload starts with a varint coefficient count,
//! then a bit stream holding every DC delta of the band, a byte alignment,
//! and the AC run/magnitude codes block by block. Coefficients are laid out
//! as whole channel planes one after another.

use super::color::ycbcr_to_bgr;
use super::idct::{inverse_dct, to_sample, ChannelClass, DequantTables};
use crate::bits::BitReader;
use crate::huffman::HuffmanTree;
use crate::tables::ZIGZAG;
use crate::varint::VarIntReader;
use crate::{CbgError, Result};

/// AC code ending the current block
const AC_END_OF_BLOCK: usize = 0x00;

/// AC code skipping 16 zig-zag positions
const AC_SKIP_16: usize = 0x0F;

/// Read-only state shared by every band task
#[derive(Debug)]
pub struct BandContext<'a> {
    /// DC magnitude-bit tree
    pub dc_tree: &'a HuffmanTree,
    /// AC run/magnitude tree
    pub ac_tree: &'a HuffmanTree,
    /// Dequantization multipliers
    pub quant: &'a DequantTables,
    /// Image width rounded up to a multiple of 8
    pub padded_width: usize,
    /// Single luma plane instead of Y/Cb/Cr
    pub grayscale: bool,
}

impl BandContext<'_> {
    fn channels(&self) -> usize {
        if self.grayscale {
            1
        } else {
            3
        }
    }

    /// Coefficients in one channel plane of a band
    fn plane_len(&self) -> usize {
        self.padded_width * 8
    }

    /// Output bytes covered by one band
    pub fn band_bytes(&self) -> usize {
        self.padded_width * 4 * 8
    }
}

/// Sign-extend a `bits`-wide magnitude whose top bit clear means negative
fn extend_sign(raw: u32, bits: u32) -> i32 {
    let raw = raw as i32;
    if raw >> (bits - 1) == 0 {
        ((-1i32 << bits) | raw) + 1
    } else {
        raw
    }
}

/// Decode one band from its payload into `output` (BGRx, `band_bytes` long)
pub fn decode_band(ctx: &BandContext<'_>, payload: &[u8], output: &mut [u8]) -> Result<()> {
    let mut header = VarIntReader::new(payload);
    let block_size = header.read_varint()? as usize;
    let layout_size = ctx.plane_len() * ctx.channels();
    if block_size > layout_size {
        return Err(CbgError::CorruptData(format!(
            "band declares {block_size} coefficients, layout holds {layout_size}"
        )));
    }

    let mut coefficients = vec![0i16; layout_size];
    let mut bits = BitReader::new(header.remaining());

    let mut acc = 0i32;
    for block in (0..block_size).step_by(64) {
        if bits.bytes_exhausted() {
            break;
        }
        let count = ctx.dc_tree.decode_token(&mut bits)? as u32;
        if count != 0 {
            acc = acc.wrapping_add(extend_sign(bits.get_bits(count)?, count));
        }
        coefficients[block] = acc as i16;
    }

    bits.align_to_byte();

    for block in (0..block_size).step_by(64) {
        if bits.bytes_exhausted() {
            break;
        }
        decode_ac_block(ctx, &mut bits, &mut coefficients[block..block + 64])?;
    }

    reconstruct(ctx, &coefficients, output);
    Ok(())
}

fn decode_ac_block(
    ctx: &BandContext<'_>,
    bits: &mut BitReader<'_>,
    block: &mut [i16],
) -> Result<()> {
    let mut index = 1;
    while index < 64 && !bits.bytes_exhausted() {
        let code = ctx.ac_tree.decode_token(bits)?;
        if code == AC_END_OF_BLOCK {
            break;
        }
        if code == AC_SKIP_16 {
            index += 16;
            continue;
        }
        index += code & 0x0F;
        if index >= 64 {
            break;
        }
        let magnitude = (code >> 4) as u32;
        let mut value = bits.get_bits(magnitude)? as i32;
        if magnitude != 0 {
            value = extend_sign(value as u32, magnitude);
        }
        block[ZIGZAG[index]] = value as i16;
        index += 1;
    }
    Ok(())
}

/// Inverse-transform every 8x8 cell and write BGR pixels with an opaque fourth byte
fn reconstruct(ctx: &BandContext<'_>, coefficients: &[i16], output: &mut [u8]) {
    let plane = ctx.plane_len();
    let stride = ctx.padded_width * 4;

    for cell in 0..ctx.padded_width / 8 {
        let mut samples = [[0u8; 64]; 3];
        for channel in 0..ctx.channels() {
            let class = if channel == 0 {
                ChannelClass::Luma
            } else {
                ChannelClass::Chroma
            };
            let start = channel * plane + cell * 64;
            let spatial = inverse_dct(&coefficients[start..start + 64], ctx.quant.table(class));
            for (sample, value) in samples[channel].iter_mut().zip(spatial) {
                *sample = to_sample(value);
            }
        }

        for j in 0..64 {
            let bgr = if ctx.grayscale {
                let luma = samples[0][j];
                [luma, luma, luma]
            } else {
                ycbcr_to_bgr(samples[0][j], samples[1][j], samples[2][j])
            };
            let dst = (j >> 3) * stride + (cell * 8 + (j & 7)) * 4;
            output[dst..dst + 3].copy_from_slice(&bgr);
            output[dst + 3] = 0xFF;
        }
    }
}
