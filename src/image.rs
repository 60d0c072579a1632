//! Decoded pixel buffer handed back to the caller

use crate::common::PixelFormat;

/// Pixel buffer produced by a decode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bytes per row; may exceed `width * bytes_per_pixel` for padded layouts
    pub stride: usize,
    /// Layout of `pixels`
    pub format: PixelFormat,
    /// `stride * height` bytes
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Borrow row `y`
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        self.pixels.get(start..start + self.stride)
    }

    /// Take ownership of the raw buffer
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Convert to tightly packed 24-bit BGR, dropping padding and alpha
    pub fn to_bgr24(&self) -> Vec<u8> {
        let width = self.width as usize;
        let mut output = Vec::with_capacity(width * self.height as usize * 3);
        for y in 0..self.height {
            let Some(row) = self.row(y) else { break };
            match self.format {
                PixelFormat::Gray8 => {
                    for &luma in &row[..width] {
                        output.extend_from_slice(&[luma, luma, luma]);
                    }
                }
                PixelFormat::Bgr565 => {
                    for chunk in row[..width * 2].chunks_exact(2) {
                        let pixel = u16::from_le_bytes([chunk[0], chunk[1]]);
                        output.push(((pixel & 0x1F) << 3) as u8);
                        output.push((((pixel >> 5) & 0x3F) << 2) as u8);
                        output.push((((pixel >> 11) & 0x1F) << 3) as u8);
                    }
                }
                PixelFormat::Bgr24 => output.extend_from_slice(&row[..width * 3]),
                PixelFormat::Bgr32 | PixelFormat::Bgra32 => {
                    for pixel in row[..width * 4].chunks_exact(4) {
                        output.extend_from_slice(&pixel[..3]);
                    }
                }
            }
        }
        output
    }
}
