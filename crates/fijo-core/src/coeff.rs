//! Quantized multiplier coefficients.
//!
//! A filter coefficient is stored as an integer `factor` of `factor_bits`
//! width together with a fractional scale: the effective real multiplier is
//! `factor / 2^scale_bits`. [`Coefficient`] owns the quantization in both
//! directions and the scaled multiply itself, so the sample path never
//! touches floating point.

use libm::round;

use crate::error::FilterError;
use crate::word;

/// An integer filter coefficient with a power-of-two fractional scale.
///
/// With `factor_bits = 9` and `scale_bits = 7` the representable multipliers
/// run from `-256/128 = -2.0` to `255/128 ≈ 1.992` in steps of `1/128`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coefficient {
    factor: i64,
    factor_bits: u32,
    scale_bits: u32,
}

impl Coefficient {
    /// Creates a zero coefficient with the given widths.
    ///
    /// `factor_bits` must lie in 2..=32; `scale_bits` may be zero (a plain
    /// integer multiplier) but is capped at 32 as well.
    pub fn new(factor_bits: u32, scale_bits: u32) -> Result<Self, FilterError> {
        if !word::width_is_valid(factor_bits) {
            return Err(FilterError::WidthOutOfRange(factor_bits));
        }
        if scale_bits > word::MAX_BITS {
            return Err(FilterError::WidthOutOfRange(scale_bits));
        }
        Ok(Self {
            factor: 0,
            factor_bits,
            scale_bits,
        })
    }

    /// Width of the integer factor in bits.
    #[inline]
    pub fn factor_bits(&self) -> u32 {
        self.factor_bits
    }

    /// Number of fractional bits; the factor is divided by `2^scale_bits`.
    #[inline]
    pub fn scale_bits(&self) -> u32 {
        self.scale_bits
    }

    /// The raw integer factor.
    #[inline]
    pub fn factor(&self) -> i64 {
        self.factor
    }

    /// The effective real multiplier, `factor / 2^scale_bits`.
    pub fn factor_real(&self) -> f64 {
        self.factor as f64 / (1i64 << self.scale_bits) as f64
    }

    /// Smallest representable integer factor.
    #[inline]
    pub fn min_factor(&self) -> i64 {
        word::min_value(self.factor_bits)
    }

    /// Largest representable integer factor.
    #[inline]
    pub fn max_factor(&self) -> i64 {
        word::max_value(self.factor_bits)
    }

    /// Smallest representable real multiplier.
    pub fn min_factor_real(&self) -> f64 {
        self.min_factor() as f64 / (1i64 << self.scale_bits) as f64
    }

    /// Largest representable real multiplier.
    pub fn max_factor_real(&self) -> f64 {
        self.max_factor() as f64 / (1i64 << self.scale_bits) as f64
    }

    /// Sets the raw integer factor.
    ///
    /// Fails with [`FilterError::CoefficientOutOfRange`] if the value does
    /// not fit `factor_bits`.
    pub fn set_factor(&mut self, factor: i64) -> Result<(), FilterError> {
        if word::overflows(factor, self.factor_bits) {
            return Err(self.range_error(factor));
        }
        self.factor = factor;
        Ok(())
    }

    /// Sets the factor from a real multiplier.
    ///
    /// Quantizes via `round(value * 2^scale_bits)`, rounding halves away
    /// from zero, then validates like [`set_factor`](Self::set_factor).
    ///
    /// # Example
    /// ```rust
    /// use fijo_core::Coefficient;
    ///
    /// let mut c = Coefficient::new(6, 5).unwrap();
    /// c.set_factor_real(0.5).unwrap();
    /// assert_eq!(c.factor(), 16);
    /// assert_eq!(c.factor_real(), 0.5);
    /// ```
    pub fn set_factor_real(&mut self, value: f64) -> Result<(), FilterError> {
        // NaN has no quantization; force it past the range check. Infinities
        // already saturate the cast to the i64 bounds.
        let quantized = if value.is_nan() {
            i64::MAX
        } else {
            self.quantize(value)
        };
        self.set_factor(quantized)
    }

    /// Changes the factor and scale widths, re-quantizing the current factor
    /// so the real multiplier is preserved as closely as possible.
    ///
    /// Validates before committing: on error the coefficient is unchanged.
    pub fn resize(&mut self, factor_bits: u32, scale_bits: u32) -> Result<(), FilterError> {
        let mut resized = Self::new(factor_bits, scale_bits)?;
        resized.set_factor_real(self.factor_real())?;
        *self = resized;
        Ok(())
    }

    /// Applies the coefficient to an input word.
    ///
    /// Computes `floor(input * factor / 2^scale_bits)` as an arithmetic
    /// right shift of the full integer product, rounding toward negative
    /// infinity exactly like a hardware shifter. The result is unreduced;
    /// callers decide how to handle values outside the output width.
    #[inline]
    pub fn apply(&self, input: i64) -> i64 {
        (input * self.factor) >> self.scale_bits
    }

    fn quantize(&self, value: f64) -> i64 {
        // Saturating float-to-int cast; the range check in set_factor
        // rejects anything the cast pinned to the i64 bounds.
        round(value * (1i64 << self.scale_bits) as f64) as i64
    }

    fn range_error(&self, value: i64) -> FilterError {
        FilterError::CoefficientOutOfRange {
            value,
            min: self.min_factor(),
            max: self.max_factor(),
            min_real: self.min_factor_real(),
            max_real: self.max_factor_real(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_widths() {
        assert!(Coefficient::new(2, 0).is_ok());
        assert!(Coefficient::new(32, 32).is_ok());
        assert!(matches!(
            Coefficient::new(1, 0),
            Err(FilterError::WidthOutOfRange(1))
        ));
        assert!(matches!(
            Coefficient::new(9, 33),
            Err(FilterError::WidthOutOfRange(33))
        ));
    }

    #[test]
    fn test_factor_bounds() {
        let c = Coefficient::new(9, 7).unwrap();
        assert_eq!(c.min_factor(), -256);
        assert_eq!(c.max_factor(), 255);
        assert_eq!(c.min_factor_real(), -2.0);
        assert_eq!(c.max_factor_real(), 255.0 / 128.0);
    }

    #[test]
    fn test_set_factor_range_check() {
        let mut c = Coefficient::new(9, 7).unwrap();
        assert!(c.set_factor(255).is_ok());
        assert!(c.set_factor(-256).is_ok());
        let err = c.set_factor(256).unwrap_err();
        assert!(matches!(
            err,
            FilterError::CoefficientOutOfRange { value: 256, .. }
        ));
        // Failed set leaves the previous factor in place.
        assert_eq!(c.factor(), -256);
    }

    #[test]
    fn test_set_factor_real_quantizes() {
        let mut c = Coefficient::new(6, 5).unwrap();
        c.set_factor_real(0.5).unwrap();
        assert_eq!(c.factor(), 16);

        c.set_factor_real(-1.0).unwrap();
        assert_eq!(c.factor(), -32);

        // Quantization step is 1/32; 0.016 rounds to 1/32.
        c.set_factor_real(0.016).unwrap();
        assert_eq!(c.factor(), 1);
    }

    #[test]
    fn test_set_factor_real_rounds_half_away_from_zero() {
        let mut c = Coefficient::new(9, 1).unwrap();
        c.set_factor_real(0.75).unwrap(); // 1.5 rounds to 2
        assert_eq!(c.factor(), 2);
        c.set_factor_real(-0.75).unwrap(); // -1.5 rounds to -2
        assert_eq!(c.factor(), -2);
    }

    #[test]
    fn test_set_factor_real_out_of_range() {
        let mut c = Coefficient::new(9, 7).unwrap();
        assert!(c.set_factor_real(1.9921875).is_ok()); // 255/128
        assert!(c.set_factor_real(2.0).is_err());
        assert!(c.set_factor_real(-2.0).is_ok());
        assert!(c.set_factor_real(-2.01).is_err());
    }

    #[test]
    fn test_set_factor_real_rejects_non_finite() {
        let mut c = Coefficient::new(9, 7).unwrap();
        assert!(c.set_factor_real(f64::NAN).is_err());
        assert!(c.set_factor_real(f64::INFINITY).is_err());
        assert!(c.set_factor_real(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_resize_preserves_real_value() {
        let mut c = Coefficient::new(9, 7).unwrap();
        c.set_factor_real(0.5).unwrap();
        assert_eq!(c.factor(), 64);

        c.resize(6, 5).unwrap();
        assert_eq!(c.factor_bits(), 6);
        assert_eq!(c.scale_bits(), 5);
        assert_eq!(c.factor(), 16);
        assert_eq!(c.factor_real(), 0.5);
    }

    #[test]
    fn test_resize_rolls_back_on_error() {
        let mut c = Coefficient::new(9, 7).unwrap();
        c.set_factor_real(1.5).unwrap();
        // 1.5 needs a factor of 96 at scale 6, out of range for 6 bits.
        assert!(c.resize(6, 6).is_err());
        assert_eq!(c.factor_bits(), 9);
        assert_eq!(c.scale_bits(), 7);
        assert_eq!(c.factor_real(), 1.5);
    }

    #[test]
    fn test_apply_floors_toward_negative_infinity() {
        let mut c = Coefficient::new(9, 7).unwrap();
        c.set_factor(255).unwrap();
        // 255 * 255 / 128 = 508.0078... floors to 508.
        assert_eq!(c.apply(255), 508);
        // -255 * 255 / 128 = -508.0078... floors to -509.
        assert_eq!(c.apply(-255), -509);
    }

    #[test]
    fn test_apply_zero_scale_is_plain_multiply() {
        let mut c = Coefficient::new(9, 0).unwrap();
        c.set_factor(-3).unwrap();
        assert_eq!(c.apply(7), -21);
    }
}
