//! Canonical second-order direct-form-II section.
//!
//! [`direct_form2`] assembles the twelve-node biquad topology that serves as
//! the engine's reference filter, and [`ideal_response`] computes the same
//! recurrence in `f64`, without quantization, wrapping, or saturation. The
//! pair is what makes quantization error measurable: run both on the same
//! input and compare.
//!
//! # Sign convention
//!
//! The feedback taps are added, not subtracted:
//!
//! ```text
//! w[n] = x[n] + a1*w[n-1] + a2*w[n-2]
//! y[n] = b0*w[n] + b1*w[n-1] + b2*w[n-2]
//! ```
//!
//! A transfer function with denominator `1 - a1*z^-1 - a2*z^-2` plugs in
//! directly; coefficients quoted against `1 + a1*z^-1 + a2*z^-2` need their
//! feedback signs flipped.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::FilterError;
use crate::filter::Filter;
use crate::graph::FilterGraph;

/// Raw integer coefficients for one biquad section.
///
/// Each field is a factor in `factor_bits` width; the effective real
/// multiplier is `factor / 2^scale_bits`, both given to [`direct_form2`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BiquadCoeffs {
    /// Feed-forward tap on `w[n]`.
    pub b0: i64,
    /// Feed-forward tap on `w[n-1]`.
    pub b1: i64,
    /// Feed-forward tap on `w[n-2]`.
    pub b2: i64,
    /// Feedback tap on `w[n-1]`, applied with positive sign.
    pub a1: i64,
    /// Feedback tap on `w[n-2]`, applied with positive sign.
    pub a2: i64,
}

/// Builds the canonical direct-form-II biquad as a sealed [`Filter`].
///
/// Node names are fixed: constant `x`; adders `w`, `fb`, `ff`, `y`; delays
/// `d1`, `d2`; multipliers `b0`, `b1`, `b2`, `a1`, `a2`. The filter's input
/// is `x`, its output `y`. All nodes share `bits`; all multipliers share
/// `factor_bits` and `scale_bits`.
///
/// # Example
/// ```rust
/// use fijo_core::{BiquadCoeffs, direct_form2};
///
/// // Near-unity pass-through: b0 = 255/128, everything else zero.
/// let coeffs = BiquadCoeffs { b0: 255, ..Default::default() };
/// let mut filter = direct_form2(9, 9, 7, &coeffs).unwrap();
/// let out = filter.impulse_response(3).unwrap();
/// assert_eq!(out, [255, 0, 0]);
/// ```
pub fn direct_form2(
    bits: u32,
    factor_bits: u32,
    scale_bits: u32,
    coeffs: &BiquadCoeffs,
) -> Result<Filter, FilterError> {
    let mut g = FilterGraph::new();

    g.add_constant("x", bits)?;
    g.add_adder("w", bits)?;
    g.add_adder("fb", bits)?;
    g.add_adder("ff", bits)?;
    g.add_adder("y", bits)?;
    g.add_delay("d1", bits)?;
    g.add_delay("d2", bits)?;
    for name in ["b0", "b1", "b2", "a1", "a2"] {
        g.add_multiplier(name, bits, factor_bits, scale_bits)?;
    }

    g.connect("w", &["x", "fb"])?;
    g.connect("fb", &["a1", "a2"])?;
    g.connect("y", &["b0", "ff"])?;
    g.connect("ff", &["b1", "b2"])?;
    g.connect("d1", &["w"])?;
    g.connect("d2", &["d1"])?;
    g.connect("b0", &["w"])?;
    g.connect("b1", &["d1"])?;
    g.connect("b2", &["d2"])?;
    g.connect("a1", &["d1"])?;
    g.connect("a2", &["d2"])?;

    g.set_factor("b0", coeffs.b0)?;
    g.set_factor("b1", coeffs.b1)?;
    g.set_factor("b2", coeffs.b2)?;
    g.set_factor("a1", coeffs.a1)?;
    g.set_factor("a2", coeffs.a2)?;

    g.into_filter("x", "y")
}

/// Computes `length` samples of the ideal (unquantized) direct-form-II
/// response for the given input data, feeding zeros once `data` runs out.
///
/// The integer coefficients are interpreted as real multipliers
/// `factor / 2^scale_bits`; the recurrence runs in `f64` with no word-width
/// limits, so differences from [`Filter::response`] on the same input are
/// pure quantization and overflow effects.
pub fn ideal_response(
    coeffs: &BiquadCoeffs,
    scale_bits: u32,
    data: &[f64],
    length: usize,
) -> Vec<f64> {
    let scale = (1i64 << scale_bits) as f64;
    let b0 = coeffs.b0 as f64 / scale;
    let b1 = coeffs.b1 as f64 / scale;
    let b2 = coeffs.b2 as f64 / scale;
    let a1 = coeffs.a1 as f64 / scale;
    let a2 = coeffs.a2 as f64 / scale;

    let mut out = Vec::with_capacity(length);
    let mut w1 = 0.0f64;
    let mut w2 = 0.0f64;
    for n in 0..length {
        let x = data.get(n).copied().unwrap_or(0.0);
        let w = x + a1 * w1 + a2 * w2;
        out.push(b0 * w + b1 * w1 + b2 * w2);
        w2 = w1;
        w1 = w;
    }
    out
}
