//! Fijo Core - fixed-point IIR filter graph engine
//!
//! This crate simulates digital filters the way integer hardware computes
//! them: every signal is a two's complement word of configurable width,
//! adders wrap, multipliers saturate, and coefficients are quantized to a
//! power-of-two scale. Bit-exact against a register-transfer view of the
//! same topology.
//!
//! # Core Abstractions
//!
//! ## Graph Construction
//!
//! - [`FilterGraph`] - Named-node builder with width, wiring, and cycle
//!   validation
//! - [`NodeKind`] - The four node roles: constant, adder, multiplier, delay
//! - [`FilterError`] - Everything that can go wrong building or running
//!
//! ## Evaluation
//!
//! - [`Filter`] - Sealed graph; feeds samples, tracks per-node overflow
//! - [`NodeStatus`] - Per-node evaluation snapshot for status dumps
//! - [`ResponseStream`] - Streaming response iterator over a borrowed filter
//!
//! ## Arithmetic
//!
//! - Word primitives: [`wrap`], [`saturate`], [`overflows`],
//!   [`min_value`], [`max_value`]
//! - [`Coefficient`] - Quantized multiplier factor with power-of-two scale
//!
//! ## Reference Topology
//!
//! - [`direct_form2`] - Canonical twelve-node biquad section
//! - [`ideal_response`] - The same recurrence in unquantized `f64`
//!
//! # Example
//!
//! ```rust
//! use fijo_core::{BiquadCoeffs, direct_form2};
//!
//! // 9-bit section, coefficients in 9 bits with 7 fractional bits.
//! let coeffs = BiquadCoeffs { b0: 255, ..Default::default() };
//! let mut filter = direct_form2(9, 9, 7, &coeffs)?;
//!
//! // Unit pulse in, response out. 255 * 255/128 would be 508, but the
//! // multiplier saturates at the 9-bit limit.
//! let response = filter.impulse_response(8)?;
//! assert_eq!(response[0], 255);
//! # Ok::<(), fijo_core::FilterError>(())
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (with `alloc`). Disable the default
//! `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! fijo-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Integer sample path**: floating point appears only at the
//!   quantization and normalization boundaries
//! - **Validation up front**: widths, wiring, and delay-free cycles are
//!   rejected before a filter runs
//! - **Registers latch together**: delays update in two phases, so
//!   evaluation order never changes results

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod coeff;
pub mod df2;
pub mod error;
pub mod filter;
pub mod graph;
pub mod node;
pub mod sequence;
pub mod word;

// Re-export main types at crate root
pub use coeff::Coefficient;
pub use df2::{BiquadCoeffs, direct_form2, ideal_response};
pub use error::FilterError;
pub use filter::{Filter, NodeInfo, NodeStatus};
pub use graph::FilterGraph;
pub use node::{NodeId, NodeKind};
pub use sequence::{ResponseStream, unit_pulse, unit_pulse_normalized};
pub use word::{MAX_BITS, MIN_BITS, max_value, min_value, overflows, saturate, width_is_valid, wrap};
