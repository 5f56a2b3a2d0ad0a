use crate::util::Float;

/// Largest 8-bit grayscale value
pub const PIXEL_MAX: Float = 255.0;

/// Maps `val` from `min..max` onto `0..1`
pub fn minmax_normalize_val(val: Float, min: Float, max: Float) -> Float {
    (val - min) / (max - min)
}

/// Maps 8-bit grayscale into 0..1
pub fn normalize_pixel(val: Float) -> Float {
    minmax_normalize_val(val, 0.0, PIXEL_MAX)
}
