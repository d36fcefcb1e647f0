//! Double-precision emulation with `f32` pairs.
//!
//! A coordinate `x: f64` is stored as `hi = x as f32` and `lo = (x - hi) as f32`.
//! Shaders recover most of the lost precision by doing subtractions on the
//! `hi` and `lo` parts separately before combining them.

/// Splits `value` into `(hi, lo)` with `hi as f64 + lo as f64 ≈ value`.
#[inline]
pub fn split_double(value: f64) -> (f32, f32) {
    let hi = value as f32;
    let lo = (value - hi as f64) as f32;
    (hi, lo)
}

/// Low part of [`split_double`].
#[inline]
pub fn low_part(value: f64) -> f32 {
    split_double(value).1
}
