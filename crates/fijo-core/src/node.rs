//! Graph node types for the filter engine.
//!
//! Each node in a filter graph has a [`NodeId`], a fixed word width, and a
//! [`NodeKind`] that determines its role: constant source, wrapping adder,
//! saturating multiplier, or unit delay. `NodeData` bundles the kind-specific
//! state with internal bookkeeping (name, width, input wiring).

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::coeff::Coefficient;

/// Unique identifier for a node in a filter graph.
///
/// Node IDs are assigned sequentially as nodes are added and never reused
/// within a graph instance. They stay valid for the lifetime of the graph
/// and of any [`Filter`](crate::Filter) built from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// The role of a node in a filter graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Holds an externally set value. Zero inputs; the graph's signal source.
    Constant,
    /// Sums two inputs, wrapping on overflow.
    Adder,
    /// Scales one input by a quantized coefficient, saturating on overflow.
    Multiplier,
    /// Unit delay register. Reading it returns the value latched on the
    /// previous step, which is what breaks feedback cycles.
    Delay,
}

impl NodeKind {
    /// Number of input slots a node of this kind owns.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            Self::Constant => 0,
            Self::Adder => 2,
            Self::Multiplier | Self::Delay => 1,
        }
    }

    /// Short lowercase label used in error messages and status dumps.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Adder => "adder",
            Self::Multiplier => "multiplier",
            Self::Delay => "delay",
        }
    }
}

/// Kind-specific node state.
#[derive(Debug)]
pub(crate) enum NodeState {
    Constant {
        /// Externally fed value, checked against the node's width on write.
        value: i64,
    },
    Adder {
        /// Set when the last evaluation wrapped.
        overflow: bool,
    },
    Multiplier {
        coeff: Coefficient,
        /// Set when the last evaluation saturated.
        overflow: bool,
    },
    Delay {
        /// Value exposed to readers this step.
        current: i64,
        /// Value sampled this step, latched into `current` when all
        /// registers clock together.
        pending: i64,
    },
}

/// Internal bookkeeping for a node in the graph.
#[derive(Debug)]
pub(crate) struct NodeData {
    pub name: String,
    /// Word width of the node's output (and expected width of its inputs).
    pub bits: u32,
    /// Wired input nodes, in slot order. Shorter than the kind's arity until
    /// `connect` fills it.
    pub inputs: Vec<NodeId>,
    pub state: NodeState,
}

impl NodeData {
    pub fn new(name: String, bits: u32, state: NodeState) -> Self {
        Self {
            name,
            bits,
            inputs: Vec::new(),
            state,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.state {
            NodeState::Constant { .. } => NodeKind::Constant,
            NodeState::Adder { .. } => NodeKind::Adder,
            NodeState::Multiplier { .. } => NodeKind::Multiplier,
            NodeState::Delay { .. } => NodeKind::Delay,
        }
    }

    /// Overflow flag from the most recent evaluation; `false` for kinds
    /// that cannot overflow.
    pub fn overflowed(&self) -> bool {
        match self.state {
            NodeState::Adder { overflow } | NodeState::Multiplier { overflow, .. } => overflow,
            NodeState::Constant { .. } | NodeState::Delay { .. } => false,
        }
    }
}
