//! Numeric helpers centralizing interpolation and lossy casts.

use num_traits::cast::cast;

/// Linear interpolation with `t` clamped to `[0, 1]`; NaN behaves like 0.
#[must_use]
pub fn lerp_clamped(from: f32, to: f32, t: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    (to - from).mul_add(t, from)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Ratio of two counts, returning 0.0 when the denominator is zero.
#[must_use]
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    usize_to_f64(numerator) / usize_to_f64(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_clamps_parameter() {
        assert!((lerp_clamped(0.0, 0.4, -1.0) - 0.0).abs() < f32::EPSILON);
        assert!((lerp_clamped(0.0, 0.4, 0.5) - 0.2).abs() < 1e-6);
        assert!((lerp_clamped(0.0, 0.4, 3.0) - 0.4).abs() < 1e-6);
        assert!((lerp_clamped(0.0, 0.4, f32::NAN) - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn ratio_handles_zero_denominator() {
        assert!((ratio(3, 0) - 0.0).abs() < f64::EPSILON);
        assert!((ratio(1, 4) - 0.25).abs() < f64::EPSILON);
    }
}
