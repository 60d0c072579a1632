//! Dequantization and separable floating-point inverse DCT
//!
//! Uses the AAN butterfly: quantization bytes are folded together with the
//! AAN prescale factors into one multiplier per coefficient, so the
//! transform itself needs only four irrational constants.

use crate::common::QUANT_TABLE_SIZE;
use crate::tables::AAN_SCALE;
use crate::{CbgError, Result};

const SQRT_2: f32 = 1.414_213_562;
const ROT_A: f32 = 1.847_759_065;
const ROT_B: f32 = 1.082_392_200;
const ROT_C: f32 = 2.613_125_930;

/// Channel class selecting a dequantization table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelClass {
    /// Y plane
    Luma,
    /// Cb and Cr planes
    Chroma,
}

/// Per-coefficient multipliers for both channel classes
#[derive(Debug, Clone)]
pub struct DequantTables {
    luma: [f32; 64],
    chroma: [f32; 64],
}

impl DequantTables {
    /// Build from the 128 quantization bytes at the start of a control block
    pub fn from_quant_bytes(quant: &[u8]) -> Result<Self> {
        if quant.len() < QUANT_TABLE_SIZE {
            return Err(CbgError::CorruptData(format!(
                "quantization table needs {QUANT_TABLE_SIZE} bytes, got {}",
                quant.len()
            )));
        }
        let mut luma = [0f32; 64];
        let mut chroma = [0f32; 64];
        for i in 0..64 {
            luma[i] = quant[i] as f32 * AAN_SCALE[i];
            chroma[i] = quant[64 + i] as f32 * AAN_SCALE[i];
        }
        Ok(Self { luma, chroma })
    }

    /// Multipliers for a channel class
    pub fn table(&self, class: ChannelClass) -> &[f32; 64] {
        match class {
            ChannelClass::Luma => &self.luma,
            ChannelClass::Chroma => &self.chroma,
        }
    }
}

/// Dequantize and inverse-transform one block of natural-order coefficients
pub fn inverse_dct(coefficients: &[i16], quant: &[f32; 64]) -> [f32; 64] {
    let mut tmp = [0f32; 64];

    // columns
    for i in 0..8 {
        let column = |row: usize| coefficients[row * 8 + i] as f32 * quant[row * 8 + i];
        if (1..8).all(|row| coefficients[row * 8 + i] == 0) {
            let dc = column(0);
            for row in 0..8 {
                tmp[row * 8 + i] = dc;
            }
            continue;
        }

        let out = butterfly([
            column(0),
            column(1),
            column(2),
            column(3),
            column(4),
            column(5),
            column(6),
            column(7),
        ]);
        for (row, value) in out.into_iter().enumerate() {
            tmp[row * 8 + i] = value;
        }
    }

    // rows
    let mut output = [0f32; 64];
    for row in 0..8 {
        let line: [f32; 8] = std::array::from_fn(|col| tmp[row * 8 + col]);
        output[row * 8..row * 8 + 8].copy_from_slice(&butterfly(line));
    }
    output
}

/// One-dimensional 8-point AAN inverse transform
fn butterfly(v: [f32; 8]) -> [f32; 8] {
    // even part
    let tmp10 = v[0] + v[4];
    let tmp11 = v[0] - v[4];
    let tmp13 = v[2] + v[6];
    let tmp12 = (v[2] - v[6]) * SQRT_2 - tmp13;

    let tmp0 = tmp10 + tmp13;
    let tmp3 = tmp10 - tmp13;
    let tmp1 = tmp11 + tmp12;
    let tmp2 = tmp11 - tmp12;

    // odd part
    let z13 = v[5] + v[3];
    let z10 = v[5] - v[3];
    let z11 = v[1] + v[7];
    let z12 = v[1] - v[7];

    let tmp7 = z11 + z13;
    let tmp11 = (z11 - z13) * SQRT_2;
    let z5 = (z10 + z12) * ROT_A;
    let tmp10 = z5 - z12 * ROT_B;
    let tmp12 = z5 - z10 * ROT_C;

    let tmp6 = tmp12 - tmp7;
    let tmp5 = tmp11 - tmp6;
    let tmp4 = tmp10 - tmp5;

    [
        tmp0 + tmp7,
        tmp1 + tmp6,
        tmp2 + tmp5,
        tmp3 + tmp4,
        tmp3 - tmp4,
        tmp2 - tmp5,
        tmp1 - tmp6,
        tmp0 - tmp7,
    ]
}

/// Level-shift a transformed value into an 8-bit sample
pub fn to_sample(value: f32) -> u8 {
    (0x80 + ((value as i32) >> 3)).clamp(0, 0xFF) as u8
}
