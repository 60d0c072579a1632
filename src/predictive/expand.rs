//! Zero-run expansion of the intermediate buffer

use crate::varint::VarIntReader;

/// Expand alternating copy/zero runs from `input` into `output`
///
/// Runs start in copy mode. Each run is a varint count followed, in copy mode,
/// by that many literal bytes. Expansion stops quietly when a count or its
/// literals would run past either buffer; bytes not reached stay zero.
pub fn expand_zero_runs(input: &[u8], output: &mut [u8]) {
    let mut reader = VarIntReader::new(input);
    let mut dst = 0;
    let mut copy_mode = true;

    while dst < output.len() {
        let Ok(count) = reader.read_varint() else {
            return;
        };
        let count = count as usize;
        let Some(end) = dst.checked_add(count).filter(|&end| end <= output.len()) else {
            return;
        };

        if copy_mode {
            let Ok(literals) = reader.take(count) else {
                return;
            };
            output[dst..end].copy_from_slice(literals);
        } else {
            output[dst..end].fill(0);
        }

        copy_mode = !copy_mode;
        dst = end;
    }
}
