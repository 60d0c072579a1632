//! Block-transform reconstruction (format version 2)
//!
//! The decrypted control block carries two quantization tables and the weight
//! tables for the DC and AC trees. An offset table after it splits the rest
//! of the body into independently decodable 8-row bands and a trailing alpha
//! segment. Trees and dequantization tables are built once, then shared
//! read-only by every band task.

mod alpha;
mod band;
mod color;
mod idct;
mod scheduler;

pub use alpha::decode_alpha;
pub use band::{decode_band, BandContext};
pub use color::ycbcr_to_bgr;
pub use idct::{inverse_dct, to_sample, ChannelClass, DequantTables};
pub use scheduler::{build_pool, AlphaJob, Band, Scheduling};

use crate::cipher::read_control_block;
use crate::common::{
    PixelFormat, AC_ALPHABET_SIZE, DC_ALPHABET_SIZE, QUANT_TABLE_SIZE,
};
use crate::header::CbgHeader;
use crate::huffman::{HuffmanTree, TreeVariant};
use crate::image::DecodedImage;
use crate::varint::VarIntReader;
use crate::{CbgError, Result};
use rayon::ThreadPool;

/// Decode a version 2 body (everything after the fixed header)
pub fn decode(
    header: &CbgHeader,
    body: &[u8],
    scheduling: Scheduling,
    pool: Option<&ThreadPool>,
) -> Result<DecodedImage> {
    let control = read_control_block(header, body)?;
    if control.len() < QUANT_TABLE_SIZE {
        return Err(CbgError::CorruptData(format!(
            "control block of {} bytes lacks quantization tables",
            control.len()
        )));
    }
    let quant = DequantTables::from_quant_bytes(&control[..QUANT_TABLE_SIZE])?;
    let mut weights = VarIntReader::new(&control[QUANT_TABLE_SIZE..]);
    let dc_tree = HuffmanTree::new(
        &weights.read_weight_table(DC_ALPHABET_SIZE)?,
        TreeVariant::IndexFirst,
    )?;
    let ac_tree = HuffmanTree::new(
        &weights.read_weight_table(AC_ALPHABET_SIZE)?,
        TreeVariant::IndexFirst,
    )?;

    let padded_width = header.padded_width();
    let padded_height = header.padded_height();
    let band_count = padded_height / 8;
    let offsets = read_offset_table(body, header.enc_length as usize, band_count)?;

    let pad_skip = (padded_width / 8).div_ceil(8);
    let bands = (0..band_count)
        .map(|index| {
            let start = offsets[index] + pad_skip;
            let end = if index + 1 == band_count {
                body.len()
            } else {
                offsets[index + 1]
            };
            if start > end {
                return Err(CbgError::TruncatedStream(format!(
                    "band {index} spans {start}..{end}"
                )));
            }
            Ok(Band {
                index,
                payload: &body[start..end],
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let alpha = (header.bpp == 32).then(|| AlphaJob {
        segment: &body[offsets[band_count]..],
        width: padded_width,
        pixels: padded_width * padded_height,
    });

    let ctx = BandContext {
        dc_tree: &dc_tree,
        ac_tree: &ac_tree,
        quant: &quant,
        padded_width,
        grayscale: header.bpp == 8,
    };

    let stride = padded_width * 4;
    let mut pixels = vec![0u8; stride * padded_height];
    log::debug!(
        "decoding {band_count} bands ({:?}), alpha segment: {}",
        scheduling,
        alpha.is_some()
    );
    if let Some(plane) = scheduler::run(&ctx, &bands, &mut pixels, alpha, scheduling, pool)? {
        for (pixel, value) in pixels.chunks_exact_mut(4).zip(plane) {
            pixel[3] = value;
        }
    }
    pixels.truncate(stride * header.height as usize);

    Ok(DecodedImage {
        width: header.width as u32,
        height: header.height as u32,
        stride,
        format: if header.bpp == 32 {
            PixelFormat::Bgra32
        } else {
            PixelFormat::Bgr32
        },
        pixels,
    })
}

/// Read `bands + 1` band offsets following the control block
///
/// Offsets are relative to the start of the body and must land between the
/// end of the table and the end of the body, in ascending order.
fn read_offset_table(body: &[u8], control_len: usize, bands: usize) -> Result<Vec<usize>> {
    let mut reader = VarIntReader::new(&body[control_len..]);
    let table_end = control_len + (bands + 1) * 4;

    let mut offsets = Vec::with_capacity(bands + 1);
    let mut previous = table_end;
    for index in 0..=bands {
        let offset = reader.read_u32_le()? as usize;
        if offset < previous || offset > body.len() {
            return Err(CbgError::CorruptData(format!(
                "band offset {index} = {offset} outside {previous}..={}",
                body.len()
            )));
        }
        offsets.push(offset);
        previous = offset;
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_table() {
        let mut body = vec![0xEEu8; 4];
        for offset in [16u32, 18, 20] {
            body.extend_from_slice(&offset.to_le_bytes());
        }
        body.resize(24, 0);
        assert_eq!(read_offset_table(&body, 4, 2).unwrap(), vec![16, 18, 20]);
    }

    #[test]
    fn test_offset_inside_table() {
        let mut body = vec![0u8; 4];
        for offset in [8u32, 16] {
            body.extend_from_slice(&offset.to_le_bytes());
        }
        body.resize(20, 0);
        assert!(matches!(
            read_offset_table(&body, 4, 1),
            Err(CbgError::CorruptData(_))
        ));
    }

    #[test]
    fn test_offsets_descending_or_past_end() {
        let mut body = vec![0u8; 4];
        for offset in [14u32, 12] {
            body.extend_from_slice(&offset.to_le_bytes());
        }
        body.resize(16, 0);
        assert!(read_offset_table(&body, 4, 1).is_err());

        let mut body = vec![0u8; 4];
        for offset in [12u32, 99] {
            body.extend_from_slice(&offset.to_le_bytes());
        }
        body.resize(16, 0);
        assert!(read_offset_table(&body, 4, 1).is_err());
    }

    #[test]
    fn test_truncated_table() {
        let body = vec![0u8; 6];
        assert!(matches!(
            read_offset_table(&body, 4, 1),
            Err(CbgError::TruncatedStream(_))
        ));
    }
}
