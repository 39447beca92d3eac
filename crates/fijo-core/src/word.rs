//! Two's-complement word arithmetic.
//!
//! Every signal in a filter graph is an integer confined to a signed two's
//! complement range of `bits` width. This module provides the range queries
//! and the two overflow-handling modes used by the node implementations:
//!
//! | Function | Behavior | Used by |
//! |----------|----------|---------|
//! | [`wrap`] | Modular reduction (discard carry bits) | Adders |
//! | [`saturate`] | Clamp to the representable range | Multipliers |
//!
//! Values are carried as `i64` throughout the crate. With word widths capped
//! at [`MAX_BITS`] bits, every intermediate the engine computes (sums of two
//! words, products of a word and a coefficient) fits in `i64` without loss.

/// Smallest supported word width in bits.
///
/// One sign bit plus at least one magnitude bit.
pub const MIN_BITS: u32 = 2;

/// Largest supported word width in bits.
///
/// Capped so that a word times a coefficient cannot exceed the `i64` range.
pub const MAX_BITS: u32 = 32;

/// Returns `true` if `bits` is a valid word width.
///
/// # Example
/// ```rust
/// use fijo_core::word::width_is_valid;
///
/// assert!(width_is_valid(9));
/// assert!(!width_is_valid(1));
/// assert!(!width_is_valid(33));
/// ```
#[inline]
pub fn width_is_valid(bits: u32) -> bool {
    (MIN_BITS..=MAX_BITS).contains(&bits)
}

/// Smallest representable value of a `bits`-wide word: `-2^(bits-1)`.
///
/// # Example
/// ```rust
/// use fijo_core::word::min_value;
///
/// assert_eq!(min_value(9), -256);
/// ```
#[inline]
pub fn min_value(bits: u32) -> i64 {
    debug_assert!(width_is_valid(bits));
    -(1i64 << (bits - 1))
}

/// Largest representable value of a `bits`-wide word: `2^(bits-1) - 1`.
///
/// # Example
/// ```rust
/// use fijo_core::word::max_value;
///
/// assert_eq!(max_value(9), 255);
/// ```
#[inline]
pub fn max_value(bits: u32) -> i64 {
    debug_assert!(width_is_valid(bits));
    (1i64 << (bits - 1)) - 1
}

/// Returns `true` if `value` does not fit in a `bits`-wide word.
///
/// # Example
/// ```rust
/// use fijo_core::word::overflows;
///
/// assert!(!overflows(255, 9));
/// assert!(overflows(256, 9));
/// assert!(!overflows(-256, 9));
/// assert!(overflows(-257, 9));
/// ```
#[inline]
pub fn overflows(value: i64, bits: u32) -> bool {
    value < min_value(bits) || value > max_value(bits)
}

/// Reduce `value` into a `bits`-wide word by discarding carry bits.
///
/// This is the reduction two's complement hardware performs for free on
/// addition: the result is congruent to `value` modulo `2^bits` and lies in
/// `[min_value(bits), max_value(bits)]`. An in-range value passes through
/// unchanged.
///
/// # Example
/// ```rust
/// use fijo_core::word::wrap;
///
/// assert_eq!(wrap(255, 9), 255);
/// assert_eq!(wrap(256, 9), -256);
/// assert_eq!(wrap(-257, 9), 255);
/// ```
#[inline]
pub fn wrap(value: i64, bits: u32) -> i64 {
    debug_assert!(width_is_valid(bits));
    let half = 1i64 << (bits - 1);
    (value + half).rem_euclid(half << 1) - half
}

/// Clamp `value` to the `bits`-wide representable range.
///
/// An in-range value passes through unchanged; anything beyond the range
/// sticks at the nearest bound.
///
/// # Example
/// ```rust
/// use fijo_core::word::saturate;
///
/// assert_eq!(saturate(255, 9), 255);
/// assert_eq!(saturate(508, 9), 255);
/// assert_eq!(saturate(-300, 9), -256);
/// ```
#[inline]
pub fn saturate(value: i64, bits: u32) -> i64 {
    value.clamp(min_value(bits), max_value(bits))
}
