//! Reverse neighbour-average prediction

/// Resolve per-channel deltas in place, top-left to bottom-right
///
/// The predictor is the truncated mean of the left and top samples of the
/// same channel, or whichever one exists on the first row/column. Samples
/// whose predictor is zero are left as stored.
pub fn reverse_average_sampling(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    pixel_size: usize,
) {
    let stride = width * pixel_size;
    for y in 0..height {
        let line = y * stride;
        for x in 0..width {
            let pixel = line + x * pixel_size;
            for p in pixel..pixel + pixel_size {
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
                    pixels[p] = pixels[p].wrapping_add(avg as u8);
                }
            }
        }
    }
}
