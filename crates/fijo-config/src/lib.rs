//! Filter description files for the fijo fixed-point filter simulator.
//!
//! This crate reads and writes filter graph descriptions and builds them
//! into runnable [`fijo_core::Filter`] instances.
//!
//! # Features
//!
//! - **Native text format**: one node per line, comma-separated
//!   `key=value` fields, `#` comments, global width defaults
//! - **TOML format**: the same description as a `[[nodes]]` table array,
//!   selected by the `.toml` file extension
//! - **Building**: width resolution against global defaults, wiring,
//!   coefficient quantization, and input/output selection in one step
//!
//! # Example
//!
//! ```rust
//! use fijo_config::{FilterSpec, NodeSpec, NodeType};
//!
//! let spec = FilterSpec::new()
//!     .with_bits(9)
//!     .with_node(NodeSpec::new(NodeType::Const, "x").as_input())
//!     .with_node(NodeSpec::new(NodeType::Delay, "d").with_connect(["x"]).as_output());
//!
//! let mut filter = spec.build().unwrap();
//! assert_eq!(filter.response(&[5, 6], 3).unwrap(), [0, 5, 6]);
//! ```

mod error;
mod parse;
mod spec;

pub use error::ConfigError;
pub use spec::{FilterSpec, NodeSpec, NodeType};
