//! Property-based tests for fijo-core arithmetic and evaluation.
//!
//! Tests the word reduction laws, coefficient quantization round trips, and
//! the evaluation-order guarantees of the register update discipline using
//! proptest for randomized input generation.

use fijo_core::{
    BiquadCoeffs, Coefficient, Filter, FilterGraph, direct_form2, ideal_response, max_value,
    overflows, saturate, unit_pulse, wrap,
};
use proptest::prelude::*;

/// Constant into a chain of `k` delay registers, all at the given width.
fn delay_chain(bits: u32, k: usize) -> Filter {
    let mut g = FilterGraph::new();
    g.add_constant("x", bits).unwrap();
    let mut prev = String::from("x");
    for i in 0..k {
        let name = format!("d{i}");
        g.add_delay(&name, bits).unwrap();
        g.connect(&name, &[&prev]).unwrap();
        prev = name;
    }
    g.into_filter("x", &prev).unwrap()
}

/// Adder fed by the input and a two-register feedback ring; 9 bits wide.
///
/// `reversed` swaps the declaration order of the two registers without
/// changing the wiring, to probe for order dependence in the update phases.
fn ring_filter(reversed: bool) -> Filter {
    let mut g = FilterGraph::new();
    g.add_constant("x", 9).unwrap();
    g.add_adder("a", 9).unwrap();
    if reversed {
        g.add_delay("d2", 9).unwrap();
        g.add_delay("d1", 9).unwrap();
    } else {
        g.add_delay("d1", 9).unwrap();
        g.add_delay("d2", 9).unwrap();
    }
    g.connect("a", &["x", "d2"]).unwrap();
    g.connect("d1", &["a"]).unwrap();
    g.connect("d2", &["d1"]).unwrap();
    g.into_filter("x", "a").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// wrap() always lands in range and is congruent to its input modulo
    /// 2^bits, for any value a sum or product can produce.
    #[test]
    fn wrap_is_modular_reduction(
        value in -(1i64 << 61)..(1i64 << 61),
        bits in 2u32..=32,
    ) {
        let wrapped = wrap(value, bits);
        prop_assert!(
            !overflows(wrapped, bits),
            "wrap({value}, {bits}) = {wrapped} is out of range"
        );
        let modulus = 1i64 << bits;
        prop_assert_eq!(
            (value - wrapped).rem_euclid(modulus),
            0,
            "wrap({}, {}) = {} is not congruent to its input",
            value, bits, wrapped
        );
    }

    /// saturate() lands in range, is idempotent, and leaves in-range values
    /// untouched.
    #[test]
    fn saturate_clamps(
        value in -(1i64 << 61)..(1i64 << 61),
        bits in 2u32..=32,
    ) {
        let clamped = saturate(value, bits);
        prop_assert!(!overflows(clamped, bits));
        prop_assert_eq!(saturate(clamped, bits), clamped);
        if !overflows(value, bits) {
            prop_assert_eq!(clamped, value);
        }
    }

    /// The overflow predicate agrees with both reductions: a value is
    /// changed by wrap() or saturate() exactly when it overflows.
    #[test]
    fn overflow_predicates_agree(
        value in -(1i64 << 61)..(1i64 << 61),
        bits in 2u32..=32,
    ) {
        let flagged = overflows(value, bits);
        prop_assert_eq!(flagged, wrap(value, bits) != value);
        prop_assert_eq!(flagged, saturate(value, bits) != value);
    }

    /// Wrapping distributes over addition: reducing the operands first
    /// never changes the reduced sum.
    #[test]
    fn wrap_add_homomorphism(
        a in -(1i64 << 40)..(1i64 << 40),
        b in -(1i64 << 40)..(1i64 << 40),
        bits in 2u32..=32,
    ) {
        prop_assert_eq!(
            wrap(a + b, bits),
            wrap(wrap(a, bits) + wrap(b, bits), bits)
        );
    }

    /// Coefficient::apply computes exactly floor(x * factor / 2^scale).
    #[test]
    fn apply_matches_floor_division(
        x in -32768i64..=32767,
        factor in -256i64..=255,
        scale_bits in 0u32..=12,
    ) {
        let mut c = Coefficient::new(9, scale_bits).unwrap();
        c.set_factor(factor).unwrap();
        prop_assert_eq!(
            c.apply(x),
            (x * factor).div_euclid(1i64 << scale_bits),
            "apply({}) with factor {} scale {} is not floor division",
            x, factor, scale_bits
        );
    }

    /// Every representable coefficient survives a real-value round trip:
    /// factor -> factor_real -> set_factor_real reproduces the factor.
    #[test]
    fn coefficient_real_round_trip(
        raw in any::<i64>(),
        factor_bits in 2u32..=16,
        scale_bits in 0u32..=12,
    ) {
        let factor = wrap(raw, factor_bits);
        let mut c = Coefficient::new(factor_bits, scale_bits).unwrap();
        c.set_factor(factor).unwrap();
        let real = c.factor_real();
        c.set_factor_real(real).unwrap();
        prop_assert_eq!(
            c.factor(), factor,
            "factor {} did not survive the round trip through {}",
            factor, real
        );
    }

    /// Quantizing an in-range real value is accurate to half a step.
    #[test]
    fn coefficient_quantization_error_is_bounded(
        factor_bits in 2u32..=16,
        scale_bits in 0u32..=12,
        t in 0.0f64..1.0,
    ) {
        let mut c = Coefficient::new(factor_bits, scale_bits).unwrap();
        let value = c.min_factor_real() + t * (c.max_factor_real() - c.min_factor_real());
        c.set_factor_real(value).unwrap();
        let step = 1.0 / (1i64 << scale_bits) as f64;
        prop_assert!(
            (c.factor_real() - value).abs() <= step / 2.0 + 1e-9,
            "quantizing {} gave {}, off by more than half a step ({})",
            value, c.factor_real(), step
        );
    }

    /// A chain of k registers delays any input sequence by exactly k steps.
    #[test]
    fn delay_chain_shifts_by_k(
        data in proptest::collection::vec(-256i64..=255, 1..32),
        k in 1usize..4,
    ) {
        let mut f = delay_chain(9, k);
        let length = data.len() + k;
        let out = f.response(&data, length).unwrap();
        prop_assert_eq!(&out[..k], &vec![0i64; k][..]);
        prop_assert_eq!(&out[k..], &data[..]);
    }

    /// Register declaration order never affects results: the two-phase
    /// update makes all registers latch from pre-step values.
    #[test]
    fn register_order_is_irrelevant(
        data in proptest::collection::vec(-256i64..=255, 1..48),
    ) {
        let mut forward = ring_filter(false);
        let mut reversed = ring_filter(true);
        let length = data.len() + 8;
        prop_assert_eq!(
            forward.response(&data, length).unwrap(),
            reversed.response(&data, length).unwrap()
        );
    }

    /// Trailing zeros in the input data are indistinguishable from the
    /// response's own zero padding.
    #[test]
    fn response_ignores_trailing_zeros(
        data in proptest::collection::vec(-256i64..=255, 0..24),
        extra in 0usize..8,
    ) {
        let mut f = ring_filter(false);
        let length = data.len() + extra + 2;
        let mut padded = data.clone();
        padded.resize(data.len() + extra, 0);
        prop_assert_eq!(
            f.response(&data, length).unwrap(),
            f.response(&padded, length).unwrap()
        );
    }

    /// response() resets first, so repeated runs are identical.
    #[test]
    fn response_is_deterministic(
        data in proptest::collection::vec(-256i64..=255, 1..32),
    ) {
        let mut f = ring_filter(false);
        let first = f.response(&data, data.len() + 4).unwrap();
        let second = f.response(&data, data.len() + 4).unwrap();
        prop_assert_eq!(first, second);
    }

    /// The unit pulse has the full-scale head and zero tail at any width.
    #[test]
    fn unit_pulse_shape(bits in 2u32..=32, length in 1usize..64) {
        let pulse = unit_pulse(bits, length);
        prop_assert_eq!(pulse.len(), length);
        prop_assert_eq!(pulse[0], max_value(bits));
        prop_assert!(pulse[1..].iter().all(|&v| v == 0));
    }

    /// With gentle coefficients (|real| <= 0.25) and 16-bit words the
    /// section never saturates, so the fixed-point impulse response stays
    /// within a few floor-rounding counts of the ideal recurrence.
    #[test]
    fn df2_tracks_ideal_for_gentle_coefficients(
        b0 in -32i64..=32,
        b1 in -32i64..=32,
        b2 in -32i64..=32,
        a1 in -32i64..=32,
        a2 in -16i64..=16,
    ) {
        let coeffs = BiquadCoeffs { b0, b1, b2, a1, a2 };
        let mut f = direct_form2(16, 9, 7, &coeffs).unwrap();
        let fixed = f.impulse_response(32).unwrap();
        let ideal = ideal_response(&coeffs, 7, &[32767.0], 32);
        for (n, (&fx, &id)) in fixed.iter().zip(ideal.iter()).enumerate() {
            prop_assert!(
                (fx as f64 - id).abs() <= 16.0,
                "step {}: fixed {} strayed from ideal {}",
                n, fx, id
            );
        }
    }
}
