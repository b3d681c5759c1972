//! Conversion between floating point degrees and fixed-point integers.
//!
//! These two functions are the only place the crate crosses between `f64` and the integer
//! domain; all subdivision arithmetic happens on the integers.

/// Scales `degrees` by `scale_factor` and truncates toward zero.
///
/// The cast saturates at the `i32` limits and maps NaN to 0, so any input is accepted.
#[inline]
pub fn to_fixed(degrees: f64, scale_factor: u32) -> i32 {
    (degrees * f64::from(scale_factor)) as i32
}

/// Divides a fixed-point value by `scale_factor`.
#[inline]
pub fn to_degrees(fixed: i32, scale_factor: u32) -> f64 {
    f64::from(fixed) / f64::from(scale_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::constants::DEFAULT_SCALE_FACTOR;

    #[test]
    fn test_truncates_toward_zero() {
        assert_eq!(to_fixed(1.23456789, 100), 123);
        assert_eq!(to_fixed(-1.23456789, 100), -123);
        assert_eq!(to_fixed(0.999, 1), 0);
        assert_eq!(to_fixed(-0.999, 1), 0);
    }

    #[test]
    fn test_bounds_fit_with_default_factor() {
        assert_eq!(to_fixed(90.0, DEFAULT_SCALE_FACTOR), 900_000_000);
        assert_eq!(to_fixed(-180.0, DEFAULT_SCALE_FACTOR), -1_800_000_000);
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        assert_eq!(to_fixed(1000.0, DEFAULT_SCALE_FACTOR), i32::MAX);
        assert_eq!(to_fixed(-1000.0, DEFAULT_SCALE_FACTOR), i32::MIN);
        assert_eq!(to_fixed(f64::NAN, DEFAULT_SCALE_FACTOR), 0);
    }

    #[test]
    fn test_to_degrees() {
        assert_eq!(to_degrees(525_000_000, DEFAULT_SCALE_FACTOR), 52.5);
        assert_eq!(to_degrees(-123, 100), -1.23);
    }
}
