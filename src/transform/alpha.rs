//! Alpha plane decoding for 32bpp version 2 images
//!
//! The alpha segment is a control word followed by an LZ-style stream: a
//! flag byte governs the next eight items, each either a literal alpha byte or
//! a 16-bit descriptor copying a run from already decoded pixels.

use crate::varint::VarIntReader;
use crate::{CbgError, Result};

/// Control word that enables the alpha stream
const ALPHA_ENABLED: u32 = 1;

/// Minimum length of a back-reference run
const MIN_COPY: usize = 3;

/// Decode the alpha segment into `plane` (one byte per padded pixel)
///
/// Returns `false` without touching `plane` when the segment is missing or
/// its control word disables alpha.
pub fn decode_alpha(segment: &[u8], width: usize, plane: &mut [u8]) -> Result<bool> {
    if segment.len() < 4 {
        log::warn!("alpha segment of {} bytes, treating as opaque", segment.len());
        return Ok(false);
    }
    let mut input = VarIntReader::new(segment);
    let control = input.read_u32_le()?;
    if control != ALPHA_ENABLED {
        log::warn!("alpha segment disabled by control word {control:#x}");
        return Ok(false);
    }

    let mut dst = 0usize;
    let mut flags = 2u32;
    while dst < plane.len() {
        flags >>= 1;
        if flags == 1 {
            flags = input.read_u8()? as u32 | 0x100;
        }

        if flags & 1 == 0 {
            plane[dst] = input.read_u8()?;
            dst += 1;
            continue;
        }

        let descriptor = input.read_u16_le()? as i32;
        let mut x = descriptor & 0x3F;
        if x > 0x1F {
            x |= -0x40;
        }
        let mut y = (descriptor >> 6) & 7;
        if y != 0 {
            y |= -8;
        }
        let count = ((descriptor >> 9) & 0x7F) as usize + MIN_COPY;

        let offset = x as isize + y as isize * width as isize;
        let src = dst as isize + offset;
        if src < 0 || src >= dst as isize {
            return Err(CbgError::CorruptData(format!(
                "alpha back-reference to {src} from {dst}"
            )));
        }

        // source may overlap the bytes being written
        let mut src = src as usize;
        for _ in 0..count {
            if dst >= plane.len() {
                break;
            }
            plane[dst] = plane[src];
            src += 1;
            dst += 1;
        }
    }
    Ok(true)
}
