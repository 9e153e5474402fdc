//! Rational factors.

use std::fmt;

use crate::Nanos;

/// A rational factor `num / den` applied to durations.
///
/// Keeps the adaptive law in integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fract {
    num: u16,
    den: u16,
}

impl Fract {
    /// Multiplies by zero.
    pub const ZERO: Fract = Fract::new(0, 1);
    /// Multiplies by one.
    pub const ONE: Fract = Fract::new(1, 1);

    /// Creates `num / den`.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub const fn new(num: u16, den: u16) -> Self {
        assert!(den != 0, "fraction denominator must be non-zero");
        Fract { num, den }
    }

    /// Numerator.
    pub const fn num(self) -> u16 {
        self.num
    }

    /// Denominator.
    pub const fn den(self) -> u16 {
        self.den
    }

    /// `p * num / den`, truncated toward zero and saturated to the `i64` range.
    pub fn mul(self, p: Nanos) -> Nanos {
        let scaled = i128::from(p) * i128::from(self.num) / i128::from(self.den);
        Nanos::try_from(scaled).unwrap_or(if scaled < 0 { Nanos::MIN } else { Nanos::MAX })
    }
}

impl fmt::Display for Fract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_truncates() {
        assert_eq!(Fract::new(17, 10).mul(1000), 1700);
        assert_eq!(Fract::new(17, 10).mul(3), 5);
        assert_eq!(Fract::new(4, 10).mul(-15), -6);
        assert_eq!(Fract::ZERO.mul(12345), 0);
        assert_eq!(Fract::ONE.mul(12345), 12345);
    }

    #[test]
    fn test_mul_saturates() {
        assert_eq!(Fract::new(2, 1).mul(Nanos::MAX), Nanos::MAX);
        assert_eq!(Fract::new(2, 1).mul(Nanos::MIN), Nanos::MIN);
        // No intermediate overflow when scaling down
        assert_eq!(Fract::new(1000, 1000).mul(Nanos::MAX), Nanos::MAX);
    }

    #[test]
    #[should_panic(expected = "denominator")]
    fn test_zero_denominator_panics() {
        let den = std::hint::black_box(0);
        let _ = Fract::new(1, den);
    }

    #[test]
    fn test_display() {
        assert_eq!(Fract::new(17, 10).to_string(), "17/10");
    }
}
