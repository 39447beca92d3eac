//! Input sequences and streaming responses.
//!
//! The canonical test input for a fixed-point filter is the unit pulse: the
//! largest positive value the input word can hold, followed by zeros. Its
//! response shows the filter's full impulse behavior at maximum headroom.
//!
//! [`ResponseStream`] drives a borrowed [`Filter`] sample by sample and is
//! what [`Filter::response`] collects; use it directly when the response is
//! consumed incrementally or is too long to buffer.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::error::FilterError;
use crate::filter::Filter;
use crate::word;

/// Returns the canonical unit pulse for a `bits`-wide input word.
///
/// Element 0 is `2^(bits-1) - 1`, the largest positive value; the remaining
/// `length - 1` elements are zero.
///
/// # Example
/// ```rust
/// use fijo_core::unit_pulse;
///
/// assert_eq!(unit_pulse(9, 4), [255, 0, 0, 0]);
/// ```
pub fn unit_pulse(bits: u32, length: usize) -> Vec<i64> {
    debug_assert!(word::width_is_valid(bits));
    let mut pulse = vec![0; length];
    if let Some(first) = pulse.first_mut() {
        *first = word::max_value(bits);
    }
    pulse
}

/// Normalized-domain variant of [`unit_pulse`].
///
/// The pulse amplitude is `(2^(bits-1) - 1) / 2^(bits-1)`, the largest
/// representable normalized value; feeding it through
/// [`Filter::feed_normalized`] reproduces the integer pulse exactly.
pub fn unit_pulse_normalized(bits: u32, length: usize) -> Vec<f64> {
    debug_assert!(word::width_is_valid(bits));
    let mut pulse = vec![0.0; length];
    if let Some(first) = pulse.first_mut() {
        *first = word::max_value(bits) as f64 / (1i64 << (bits - 1)) as f64;
    }
    pulse
}

/// Iterator over a filter's response to an input sequence.
///
/// Created by [`Filter::stream`]. The filter is reset when the stream is
/// constructed; each `next` feeds one sample, taking input values from the
/// data slice and zeros once it is exhausted, and yields exactly `length`
/// items unless a step fails. After an error the stream ends.
pub struct ResponseStream<'a> {
    filter: &'a mut Filter,
    data: &'a [i64],
    pos: usize,
    remaining: usize,
}

impl<'a> ResponseStream<'a> {
    pub(crate) fn new(filter: &'a mut Filter, data: &'a [i64], length: usize) -> Self {
        filter.reset();
        Self {
            filter,
            data,
            pos: 0,
            remaining: length,
        }
    }
}

impl Iterator for ResponseStream<'_> {
    type Item = Result<i64, FilterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let x = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        self.remaining -= 1;
        let out = self.filter.feed(x);
        if out.is_err() {
            // A failed step leaves no valid state to continue from.
            self.remaining = 0;
        }
        Some(out)
    }

    // Not an ExactSizeIterator: an error ends the stream short of `length`.
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl core::iter::FusedIterator for ResponseStream<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FilterGraph;

    fn delay_filter(bits: u32) -> Filter {
        let mut g = FilterGraph::new();
        g.add_constant("x", bits).unwrap();
        g.add_delay("d", bits).unwrap();
        g.connect("d", &["x"]).unwrap();
        g.into_filter("x", "d").unwrap()
    }

    #[test]
    fn test_unit_pulse_values() {
        assert_eq!(unit_pulse(9, 4), [255, 0, 0, 0]);
        assert_eq!(unit_pulse(2, 3), [1, 0, 0]);
        assert_eq!(unit_pulse(9, 0), []);
    }

    #[test]
    fn test_unit_pulse_normalized_amplitude() {
        let pulse = unit_pulse_normalized(9, 2);
        assert_eq!(pulse, [255.0 / 256.0, 0.0]);
    }

    #[test]
    fn test_stream_zero_extends() {
        let mut f = delay_filter(9);
        let out: Vec<i64> = f.stream(&[5], 4).collect::<Result<_, _>>().unwrap();
        assert_eq!(out, [0, 5, 0, 0]);
    }

    #[test]
    fn test_stream_is_bounded() {
        let mut f = delay_filter(9);
        assert_eq!(f.stream(&[1, 2, 3, 4], 2).count(), 2);
        assert_eq!(f.stream(&[], 0).count(), 0);
    }

    #[test]
    fn test_stream_resets_filter() {
        let mut f = delay_filter(9);
        f.feed(99).unwrap();
        let first: Vec<i64> = f.stream(&[1], 2).collect::<Result<_, _>>().unwrap();
        // The 99 left in the pipeline must not leak into the fresh run.
        assert_eq!(first, [0, 1]);
    }

    #[test]
    fn test_stream_ends_after_error() {
        let mut f = delay_filter(9);
        let mut stream = f.stream(&[300], 5);
        assert!(matches!(stream.next(), Some(Err(FilterError::Overflow { .. }))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_stream_size_hint_counts_down() {
        let mut f = delay_filter(9);
        let mut stream = f.stream(&[1], 3);
        assert_eq!(stream.size_hint(), (0, Some(3)));
        stream.next();
        assert_eq!(stream.size_hint(), (0, Some(2)));
    }
}
