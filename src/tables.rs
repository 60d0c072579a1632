//! Static tables for the block transform path

/// Natural (raster) position of each zig-zag coefficient index
pub const ZIGZAG: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// AAN prescale factors `s(u) * s(v)` with `s(0) = 1` and `s(k) = sqrt(2) * cos(k*pi/16)`
#[rustfmt::skip]
pub const AAN_SCALE: [f32; 64] = [
    1.00000000, 1.38703985, 1.30656296, 1.17587560, 1.00000000, 0.78569496, 0.54119610, 0.27589938,
    1.38703985, 1.92387953, 1.81225489, 1.63098631, 1.38703985, 1.08979021, 0.75066056, 0.38268343,
    1.30656296, 1.81225489, 1.70710678, 1.53635551, 1.30656296, 1.02655993, 0.70710678, 0.36047991,
    1.17587560, 1.63098631, 1.53635551, 1.38268343, 1.17587560, 0.92387953, 0.63637929, 0.32442335,
    1.00000000, 1.38703985, 1.30656296, 1.17587560, 1.00000000, 0.78569496, 0.54119610, 0.27589938,
    0.78569496, 1.08979021, 1.02655993, 0.92387953, 0.78569496, 0.61731657, 0.42521505, 0.21677275,
    0.54119610, 0.75066056, 0.70710678, 0.63637929, 0.54119610, 0.42521505, 0.29289322, 0.14931567,
    0.27589938, 0.38268343, 0.36047991, 0.32442335, 0.27589938, 0.21677275, 0.14931567, 0.07612047,
];
