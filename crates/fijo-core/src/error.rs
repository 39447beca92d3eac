//! Error type shared by graph construction and filter evaluation.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::node::NodeKind;

/// Errors that can occur while building or running a filter graph.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A word width outside the supported 2..=32 bit range.
    WidthOutOfRange(u32),
    /// A node with this name already exists in the graph.
    DuplicateName(String),
    /// No node with this name exists in the graph.
    UnknownName(String),
    /// A node was wired with the wrong number of inputs.
    InvalidArity {
        /// Node being wired.
        name: String,
        /// Input slots its kind owns.
        expected: usize,
        /// Inputs actually supplied.
        got: usize,
    },
    /// Two connected nodes disagree on word width.
    BitWidthMismatch {
        /// Node being wired.
        name: String,
        /// Input node it was wired to.
        input: String,
        /// Word width of the node being wired.
        bits: u32,
        /// Word width of the input node.
        input_bits: u32,
    },
    /// A node's input slots were never wired.
    NotConnected(String),
    /// An operation addressed a node whose kind does not support it.
    TypeMismatch {
        /// Node that was addressed.
        name: String,
        /// Kind the operation requires.
        expected: NodeKind,
        /// Kind the node actually has.
        found: NodeKind,
    },
    /// A value does not fit a node's word width.
    Overflow {
        /// Node that received the value.
        name: String,
        /// The out-of-range value.
        value: i64,
        /// Word width it had to fit.
        bits: u32,
    },
    /// A coefficient does not fit its factor width.
    CoefficientOutOfRange {
        /// The quantized coefficient that was rejected.
        value: i64,
        /// Smallest representable coefficient.
        min: i64,
        /// Largest representable coefficient.
        max: i64,
        /// `min` divided by the scale factor.
        min_real: f64,
        /// `max` divided by the scale factor.
        max_real: f64,
    },
    /// A feedback cycle with no delay register on it.
    CombinationalLoop(String),
    /// A per-node property queried graph-wide differs between nodes.
    NonUniform(&'static str),
}

#[cfg(feature = "std")]
impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::WidthOutOfRange(bits) => {
                write!(f, "word width must be 2 to 32 bits, got {bits}")
            }
            Self::DuplicateName(name) => write!(f, "node '{name}' already present"),
            Self::UnknownName(name) => write!(f, "no node named '{name}'"),
            Self::InvalidArity {
                name,
                expected,
                got,
            } => {
                write!(
                    f,
                    "node '{name}' takes {expected} input(s), got {got}"
                )
            }
            Self::BitWidthMismatch {
                name,
                input,
                bits,
                input_bits,
            } => {
                write!(
                    f,
                    "number of bits does not match: node '{name}' is {bits} bits but input '{input}' is {input_bits} bits"
                )
            }
            Self::NotConnected(name) => write!(f, "node '{name}' is not fully connected"),
            Self::TypeMismatch {
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "node '{name}' is a {}, expected a {}",
                    found.as_str(),
                    expected.as_str()
                )
            }
            Self::Overflow { name, value, bits } => {
                write!(
                    f,
                    "input overflow: value {value} does not fit in {bits} bits at node '{name}'"
                )
            }
            Self::CoefficientOutOfRange {
                value,
                min,
                max,
                min_real,
                max_real,
            } => {
                write!(
                    f,
                    "factor {value} must be in the range {min} to {max} ({min_real:.6} to {max_real:.6} normalized)"
                )
            }
            Self::CombinationalLoop(name) => {
                write!(
                    f,
                    "feedback loop through node '{name}' contains no delay"
                )
            }
            Self::NonUniform(what) => {
                write!(f, "number of {what} is not the same for all nodes")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FilterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            FilterError::WidthOutOfRange(1).to_string(),
            "word width must be 2 to 32 bits, got 1"
        );
        assert_eq!(
            FilterError::DuplicateName("x".into()).to_string(),
            "node 'x' already present"
        );
        assert_eq!(
            FilterError::UnknownName("y".into()).to_string(),
            "no node named 'y'"
        );
        assert_eq!(
            FilterError::NonUniform("bits").to_string(),
            "number of bits is not the same for all nodes"
        );
    }

    #[test]
    fn test_display_coefficient_range() {
        let err = FilterError::CoefficientOutOfRange {
            value: 256,
            min: -256,
            max: 255,
            min_real: -2.0,
            max_real: 1.9921875,
        };
        assert_eq!(
            err.to_string(),
            "factor 256 must be in the range -256 to 255 (-2.000000 to 1.992188 normalized)"
        );
    }

    #[test]
    fn test_display_type_mismatch() {
        let err = FilterError::TypeMismatch {
            name: "d1".into(),
            expected: NodeKind::Multiplier,
            found: NodeKind::Delay,
        };
        assert_eq!(err.to_string(), "node 'd1' is a delay, expected a multiplier");
    }
}
