//! YCbCr to BGR conversion

/// Clamp a float into a byte, truncating the fraction
fn to_byte(value: f32) -> u8 {
    if value >= 255.0 {
        0xFF
    } else if value <= 0.0 {
        0
    } else {
        value as u8
    }
}

/// Convert one full-range YCbCr sample (chroma centred at 128) to `[b, g, r]`
pub fn ycbcr_to_bgr(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let (y, cb, cr) = (y as f32, cb as f32, cr as f32);
    let r = y + 1.402 * cr - 178.956;
    let g = y - 0.34414 * cb - 0.71414 * cr + 135.95984;
    let b = y + 1.772 * cb - 226.316;
    [to_byte(b), to_byte(g), to_byte(r)]
}
