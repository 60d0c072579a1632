//! Synthetic CompressedBG stream builders shared by the integration tests
//!
//! There is no encoder in the crate, so these helpers assemble blobs from
//! first principles: varint tables, keystream encryption, Huffman codes taken
//! from the decoder's own trees, and hand-laid offset tables.

#![allow(dead_code)]

use cbglib::tables::ZIGZAG;
use cbglib::{CbgHeader, HuffmanTree, KeyedByteCipher, TreeVariant};

/// MSB-first bit writer
#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    used: u32,
}

impl BitWriter {
    pub fn push_bit(&mut self, bit: bool) {
        if self.used == 0 {
            self.bytes.push(0);
        }
        if bit {
            *self.bytes.last_mut().unwrap() |= 0x80 >> self.used;
        }
        self.used = (self.used + 1) % 8;
    }

    pub fn push_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            self.push_bit((value >> i) & 1 != 0);
        }
    }

    pub fn push_path(&mut self, path: &[bool]) {
        for &bit in path {
            self.push_bit(bit);
        }
    }

    pub fn align(&mut self) {
        self.used = 0;
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn varint(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let group = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(group);
            return;
        }
        out.push(group | 0x80);
    }
}

/// Encrypt a plain control block and return it with its (sum, xor)
pub fn encrypt(plain: &[u8], key: u32) -> (Vec<u8>, u8, u8) {
    let mut cipher = KeyedByteCipher::new(key);
    let encrypted = plain
        .iter()
        .map(|b| b.wrapping_add(cipher.next_byte()))
        .collect();
    let sum = plain.iter().fold(0u8, |a, b| a.wrapping_add(*b));
    let xor = plain.iter().fold(0u8, |a, b| a ^ b);
    (encrypted, sum, xor)
}

fn header(width: u16, height: u16, bpp: u32, version: u16, key: u32) -> CbgHeader {
    CbgHeader {
        width,
        height,
        bpp,
        intermediate_length: 0,
        key,
        enc_length: 0,
        check_sum: 0,
        check_xor: 0,
        version,
    }
}

// ---------------------------------------------------------------------------
// Version 0/1

/// Forward average prediction: the deltas the decoder resolves back to `pixels`
pub fn predict(pixels: &[u8], width: usize, height: usize, pixel_size: usize) -> Vec<u8> {
    let stride = width * pixel_size;
    let mut deltas = pixels.to_vec();
    for y in 0..height {
        for x in 0..width {
            for c in 0..pixel_size {
                let p = y * stride + x * pixel_size + c;
                let mut avg = 0u32;
                if x > 0 {
                    avg += pixels[p - pixel_size] as u32;
                }
                if y > 0 {
                    avg += pixels[p - stride] as u32;
                }
                if x > 0 && y > 0 {
                    avg /= 2;
                }
                if avg != 0 {
                    deltas[p] = pixels[p].wrapping_sub(avg as u8);
                }
            }
        }
    }
    deltas
}

/// Alternating copy/zero run encoding, starting with a copy run
pub fn zero_runs(deltas: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut pos = 0;
    let mut copy_mode = true;
    while pos < deltas.len() {
        let start = pos;
        while pos < deltas.len() && (deltas[pos] != 0) == copy_mode {
            pos += 1;
        }
        varint((pos - start) as u32, &mut out);
        if copy_mode {
            out.extend_from_slice(&deltas[start..pos]);
        }
        copy_mode = !copy_mode;
    }
    out
}

/// Assemble a version 0/1 blob from an intermediate byte buffer
pub fn v1_blob_from_intermediate(
    width: u16,
    height: u16,
    bpp: u32,
    key: u32,
    intermediate: &[u8],
) -> Vec<u8> {
    let mut weights = [0u32; 256];
    for &b in intermediate {
        weights[b as usize] += 1;
    }
    if intermediate.is_empty() {
        weights[0] = 1;
    }

    let mut control = Vec::new();
    for &w in &weights {
        varint(w, &mut control);
    }

    let tree = HuffmanTree::new(&weights, TreeVariant::FullScan).unwrap();
    let paths = tree.leaf_paths();
    let mut bits = BitWriter::default();
    for &b in intermediate {
        bits.push_path(paths[b as usize].as_ref().unwrap());
    }

    let (encrypted, sum, xor) = encrypt(&control, key);
    let mut hdr = header(width, height, bpp, 0, key);
    hdr.intermediate_length = intermediate.len() as u32;
    hdr.enc_length = encrypted.len() as u32;
    hdr.check_sum = sum;
    hdr.check_xor = xor;

    let mut blob = hdr.to_bytes().to_vec();
    blob.extend_from_slice(&encrypted);
    blob.extend_from_slice(&bits.finish());
    blob
}

/// Encode `pixels` (packed, `width * bpp / 8` stride) as a version 0 blob
pub fn v1_blob(width: u16, height: u16, bpp: u32, key: u32, pixels: &[u8]) -> Vec<u8> {
    let pixel_size = bpp as usize / 8;
    let deltas = predict(pixels, width as usize, height as usize, pixel_size);
    v1_blob_from_intermediate(width, height, bpp, key, &zero_runs(&deltas))
}

// ---------------------------------------------------------------------------
// Version 2

/// One 8x8 block: DC value and (zig-zag index, value) AC terms in ascending order
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub dc: i16,
    pub ac: Vec<(usize, i16)>,
}

impl Block {
    /// Natural-order coefficient array
    pub fn coefficients(&self) -> [i16; 64] {
        let mut out = [0i16; 64];
        out[0] = self.dc;
        for &(index, value) in &self.ac {
            out[ZIGZAG[index]] = value;
        }
        out
    }
}

/// Version 2 image description: blocks indexed `[band][channel][cell]`
pub struct V2Image {
    pub width: u16,
    pub height: u16,
    pub bpp: u32,
    pub key: u32,
    pub quant: [u8; 128],
    pub bands: Vec<Vec<Vec<Block>>>,
    /// Raw alpha segment (control word included); `None` writes nothing
    pub alpha: Option<Vec<u8>>,
}

fn magnitude_bits(value: i32) -> u32 {
    32 - value.unsigned_abs().leading_zeros()
}

fn magnitude_raw(value: i32, bits: u32) -> u32 {
    if value > 0 {
        value as u32
    } else {
        (value + (1 << bits) - 1) as u32
    }
}

fn encode_band(
    blocks: &[Vec<Block>],
    dc_paths: &[Option<Vec<bool>>],
    ac_paths: &[Option<Vec<bool>>],
    pad_skip: usize,
) -> Vec<u8> {
    let all: Vec<&Block> = blocks.iter().flatten().collect();
    let mut bits = BitWriter::default();

    let mut acc = 0i32;
    for block in &all {
        let delta = block.dc as i32 - acc;
        acc = block.dc as i32;
        let count = magnitude_bits(delta);
        bits.push_path(dc_paths[count as usize].as_ref().unwrap());
        if count != 0 {
            bits.push_bits(magnitude_raw(delta, count), count);
        }
    }
    bits.align();

    for block in &all {
        let mut index = 1usize;
        for &(position, value) in &block.ac {
            let mut run = position - index;
            while run >= 16 {
                bits.push_path(ac_paths[0x0F].as_ref().unwrap());
                run -= 16;
            }
            let size = magnitude_bits(value as i32);
            let code = ((size as usize) << 4) | run;
            bits.push_path(ac_paths[code].as_ref().unwrap());
            bits.push_bits(magnitude_raw(value as i32, size), size);
            index = position + 1;
        }
        if index < 64 {
            bits.push_path(ac_paths[0].as_ref().unwrap());
        }
    }

    let mut payload = vec![0u8; pad_skip];
    varint((all.len() * 64) as u32, &mut payload);
    payload.extend_from_slice(&bits.finish());
    // trailing bytes keep the decoder's exhaustion guard clear of real data
    payload.extend_from_slice(&[0, 0]);
    payload
}

/// Assemble a version 2 blob
pub fn v2_blob(image: &V2Image) -> Vec<u8> {
    let dc_weights = [1u32; 16];
    let ac_weights = [1u32; 176];
    let dc_paths = HuffmanTree::new(&dc_weights, TreeVariant::IndexFirst)
        .unwrap()
        .leaf_paths();
    let ac_paths = HuffmanTree::new(&ac_weights, TreeVariant::IndexFirst)
        .unwrap()
        .leaf_paths();

    let mut control = image.quant.to_vec();
    for &w in dc_weights.iter().chain(ac_weights.iter()) {
        varint(w, &mut control);
    }
    let (encrypted, sum, xor) = encrypt(&control, image.key);

    let padded_width = (image.width as usize + 7) & !7;
    let pad_skip = (padded_width / 8).div_ceil(8);
    let payloads: Vec<Vec<u8>> = image
        .bands
        .iter()
        .map(|band| encode_band(band, &dc_paths, &ac_paths, pad_skip))
        .collect();

    let table_len = (payloads.len() + 1) * 4;
    let mut offset = encrypted.len() + table_len;
    let mut table = Vec::with_capacity(table_len);
    for payload in &payloads {
        table.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += payload.len();
    }
    table.extend_from_slice(&(offset as u32).to_le_bytes());

    let mut hdr = header(image.width, image.height, image.bpp, 2, image.key);
    hdr.enc_length = encrypted.len() as u32;
    hdr.check_sum = sum;
    hdr.check_xor = xor;

    let mut blob = hdr.to_bytes().to_vec();
    blob.extend_from_slice(&encrypted);
    blob.extend_from_slice(&table);
    for payload in &payloads {
        blob.extend_from_slice(payload);
    }
    if let Some(alpha) = &image.alpha {
        blob.extend_from_slice(alpha);
    }
    blob
}

/// Alpha segment made only of literals
pub fn literal_alpha(values: &[u8]) -> Vec<u8> {
    let mut out = 1u32.to_le_bytes().to_vec();
    for chunk in values.chunks(8) {
        out.push(0);
        out.extend_from_slice(chunk);
    }
    out
}

/// Deterministic pseudo-random blocks for a `width x height` image
pub fn pattern_bands(width: u16, height: u16, channels: usize, seed: u32) -> Vec<Vec<Vec<Block>>> {
    let cells = ((width as usize + 7) & !7) / 8;
    let band_count = ((height as usize + 7) & !7) / 8;
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        state >> 8
    };

    let mut bands = Vec::with_capacity(band_count);
    for _ in 0..band_count {
        let mut planes = Vec::with_capacity(channels);
        for _ in 0..channels {
            let mut blocks = Vec::with_capacity(cells);
            for _ in 0..cells {
                let dc = (next() % 600) as i16 - 300;
                let mut ac = Vec::new();
                let mut index = 1 + (next() % 6) as usize;
                while index < 64 {
                    let value = (next() % 81) as i16 - 40;
                    if value != 0 {
                        ac.push((index, value));
                    }
                    index += 1 + (next() % 20) as usize;
                }
                blocks.push(Block { dc, ac });
            }
            planes.push(blocks);
        }
        bands.push(planes);
    }
    bands
}
