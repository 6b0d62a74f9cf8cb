//! Fixed-precision number formatting
//!
//! Renders a float with exactly `bit` digits after the decimal point,
//! rounding to nearest. The separator is always `.` and zero requested
//! digits produces no separator at all (`3.14159` at 0 digits is `"3"`).
//! Non-finite values render as `NaN`, `inf` and `-inf`.

use crate::error::{LifescopeError, Result};
use std::fmt;

/// A float paired with a precision; formats without allocating
///
/// `f32` values are widened to `f64` first, which is exact, so both
/// widths round from the same decimal expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPoint {
    value: f64,
    bit: usize,
}

impl FixedPoint {
    pub const fn new(value: f64, bit: usize) -> Self {
        Self { value, bit }
    }

    pub fn from_f32(value: f32, bit: usize) -> Self {
        Self::new(f64::from(value), bit)
    }

    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Digits rendered after the decimal separator
    pub const fn bit(&self) -> usize {
        self.bit
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.prec$}", self.value, prec = self.bit)
    }
}

/// Format a double with exactly `bit` fractional digits
pub fn format_double_x_bit(value: f64, bit: usize) -> String {
    FixedPoint::new(value, bit).to_string()
}

/// Format a float with exactly `bit` fractional digits
pub fn format_float_x_bit(value: f32, bit: usize) -> String {
    FixedPoint::from_f32(value, bit).to_string()
}

/// Checked variant for callers holding a signed precision
///
/// A negative `bit` is rejected with [`LifescopeError::Format`].
pub fn try_format_x_bit(value: impl Into<f64>, bit: i64) -> Result<String> {
    let bit = usize::try_from(bit)
        .map_err(|_| LifescopeError::format(format!("precision must be >= 0, got {}", bit)))?;
    Ok(format_double_x_bit(value.into(), bit))
}

/// Method-style formatting, `3.14159_f64.format_x_bit(2) == "3.14"`
pub trait FormatXBit {
    fn fixed(self, bit: usize) -> FixedPoint;

    fn format_x_bit(self, bit: usize) -> String
    where
        Self: Sized,
    {
        self.fixed(bit).to_string()
    }
}

impl FormatXBit for f64 {
    fn fixed(self, bit: usize) -> FixedPoint {
        FixedPoint::new(self, bit)
    }
}

impl FormatXBit for f32 {
    fn fixed(self, bit: usize) -> FixedPoint {
        FixedPoint::from_f32(self, bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_digits() {
        assert_eq!(format_double_x_bit(3.14159, 2), "3.14");
        assert_eq!(format_double_x_bit(2.0, 3), "2.000");
        assert_eq!(format_double_x_bit(-1.5, 2), "-1.50");
    }

    #[test]
    fn test_zero_digits_has_no_separator() {
        assert_eq!(format_double_x_bit(3.14159, 0), "3");
        assert_eq!(format_double_x_bit(3.7, 0), "4");
    }

    #[test]
    fn test_rounds_rather_than_truncates() {
        assert_eq!(format_double_x_bit(2.675_9, 2), "2.68");
        assert_eq!(format_double_x_bit(0.999_9, 3), "1.000");
        assert_eq!(format_double_x_bit(9.96, 1), "10.0");
    }

    #[test]
    fn test_float_variant() {
        assert_eq!(format_float_x_bit(2.5, 1), "2.5");
        assert_eq!(format_float_x_bit(1.25, 4), "1.2500");
    }

    #[test]
    fn test_method_style_matches_free_function() {
        for &(v, bit) in &[(3.14159_f64, 2_usize), (-0.001, 5), (1.0e6, 1), (42.0, 0)] {
            assert_eq!(v.format_x_bit(bit), format_double_x_bit(v, bit));
        }
        assert_eq!(2.5_f32.format_x_bit(1), format_float_x_bit(2.5, 1));
    }

    #[test]
    fn test_fixed_point_display_in_format_args() {
        let s = format!("[{}]", 1.005_f64.fixed(1));
        assert_eq!(s, "[1.0]");
        assert_eq!(FixedPoint::new(0.5, 2).bit(), 2);
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_double_x_bit(f64::NAN, 2), "NaN");
        assert_eq!(format_double_x_bit(f64::INFINITY, 2), "inf");
        assert_eq!(format_double_x_bit(f64::NEG_INFINITY, 0), "-inf");
    }

    #[test]
    fn test_try_format_rejects_negative_precision() {
        assert_eq!(try_format_x_bit(3.14159, 2).unwrap(), "3.14");
        assert_eq!(try_format_x_bit(2.5_f32, 1).unwrap(), "2.5");
        let err = try_format_x_bit(1.0, -1).unwrap_err();
        assert!(matches!(err, LifescopeError::Format { .. }));
        assert!(err.to_string().contains("-1"));
    }
}
