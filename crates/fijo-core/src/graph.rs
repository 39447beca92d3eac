//! Filter graph construction and validation.
//!
//! [`FilterGraph`] is the mutable builder for a fixed-point filter. Nodes are
//! added by name, wired with [`connect`](FilterGraph::connect), and the
//! finished topology is sealed into a runnable [`Filter`] by
//! [`into_filter`](FilterGraph::into_filter).
//!
//! Validation is front-loaded: word widths, duplicate names, arity and width
//! agreement are checked as the graph is built, and sealing verifies that
//! every input slot is wired and that every feedback cycle passes through at
//! least one delay register. A cycle made only of adders and multipliers has
//! no settled value, so such graphs are rejected outright.

#[cfg(not(feature = "std"))]
use alloc::{string::ToString, vec, vec::Vec};

use crate::coeff::Coefficient;
use crate::error::FilterError;
use crate::filter::Filter;
use crate::node::{NodeData, NodeId, NodeKind, NodeState};
use crate::word;

/// Mutable builder for a fixed-point filter graph.
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new)
/// 2. Add nodes: [`add_constant()`](Self::add_constant), [`add_adder()`](Self::add_adder),
///    [`add_multiplier()`](Self::add_multiplier), [`add_delay()`](Self::add_delay)
/// 3. Wire inputs: [`connect()`](Self::connect)
/// 4. Seal: [`into_filter()`](Self::into_filter)
///
/// # Example
///
/// ```rust
/// use fijo_core::FilterGraph;
///
/// let mut g = FilterGraph::new();
/// g.add_constant("x", 9).unwrap();
/// g.add_adder("sum", 9).unwrap();
/// g.add_delay("d", 9).unwrap();
/// g.connect("sum", &["x", "d"]).unwrap();
/// g.connect("d", &["sum"]).unwrap();
/// let filter = g.into_filter("x", "sum").unwrap();
/// # let _ = filter;
/// ```
#[derive(Default)]
pub struct FilterGraph {
    nodes: Vec<NodeData>,
}

impl FilterGraph {
    /// Creates a new empty filter graph.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    // --- Node mutations ---

    /// Adds a constant source node. Returns the new node's ID.
    ///
    /// The node starts at value zero; the value is set through the
    /// [`Filter`] once the graph is sealed.
    pub fn add_constant(&mut self, name: &str, bits: u32) -> Result<NodeId, FilterError> {
        let id = self.add_node(name, bits, NodeState::Constant { value: 0 })?;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: constant '{name}', {bits} bits");
        Ok(id)
    }

    /// Adds a two-input adder node. Returns the new node's ID.
    ///
    /// Adders reduce their sum into the word width by wrapping, the way
    /// two's complement addition hardware does.
    pub fn add_adder(&mut self, name: &str, bits: u32) -> Result<NodeId, FilterError> {
        let id = self.add_node(name, bits, NodeState::Adder { overflow: false })?;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: adder '{name}', {bits} bits");
        Ok(id)
    }

    /// Adds a coefficient multiplier node. Returns the new node's ID.
    ///
    /// The coefficient starts at zero; set it with
    /// [`set_factor`](Self::set_factor) or
    /// [`set_factor_real`](Self::set_factor_real). Multipliers reduce
    /// out-of-range products by saturating.
    pub fn add_multiplier(
        &mut self,
        name: &str,
        bits: u32,
        factor_bits: u32,
        scale_bits: u32,
    ) -> Result<NodeId, FilterError> {
        let coeff = Coefficient::new(factor_bits, scale_bits)?;
        let id = self.add_node(
            name,
            bits,
            NodeState::Multiplier {
                coeff,
                overflow: false,
            },
        )?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_add: multiplier '{name}', {bits} bits, factor {factor_bits}/{scale_bits}"
        );
        Ok(id)
    }

    /// Adds a unit delay node. Returns the new node's ID.
    ///
    /// Delay registers start at zero and are the only node kind allowed on
    /// a feedback cycle.
    pub fn add_delay(&mut self, name: &str, bits: u32) -> Result<NodeId, FilterError> {
        let id = self.add_node(
            name,
            bits,
            NodeState::Delay {
                current: 0,
                pending: 0,
            },
        )?;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: delay '{name}', {bits} bits");
        Ok(id)
    }

    /// Wires a node's input slots, in slot order.
    ///
    /// Replaces any previous wiring of the node. Fails if:
    /// - `name` or any input name is unknown
    /// - the number of inputs does not match the node kind's arity
    /// - any input node has a different word width
    pub fn connect(&mut self, name: &str, inputs: &[&str]) -> Result<(), FilterError> {
        let id = self.lookup(name)?;
        let node = &self.nodes[id.index() as usize];
        let expected = node.kind().arity();
        if inputs.len() != expected {
            return Err(FilterError::InvalidArity {
                name: node.name.clone(),
                expected,
                got: inputs.len(),
            });
        }
        let bits = node.bits;

        let mut resolved = Vec::with_capacity(inputs.len());
        for input in inputs {
            let input_id = self.lookup(input)?;
            let input_bits = self.nodes[input_id.index() as usize].bits;
            if input_bits != bits {
                return Err(FilterError::BitWidthMismatch {
                    name: name.to_string(),
                    input: (*input).to_string(),
                    bits,
                    input_bits,
                });
            }
            resolved.push(input_id);
        }
        self.nodes[id.index() as usize].inputs = resolved;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: '{name}' <- {inputs:?}");
        Ok(())
    }

    /// Sets a multiplier's raw integer factor.
    ///
    /// Fails if the node is not a multiplier or the factor does not fit its
    /// coefficient width.
    pub fn set_factor(&mut self, name: &str, factor: i64) -> Result<(), FilterError> {
        let id = self.lookup(name)?;
        let node = &mut self.nodes[id.index() as usize];
        let found = node.kind();
        match &mut node.state {
            NodeState::Multiplier { coeff, .. } => coeff.set_factor(factor),
            _ => Err(FilterError::TypeMismatch {
                name: name.to_string(),
                expected: NodeKind::Multiplier,
                found,
            }),
        }
    }

    /// Sets a multiplier's factor from a real multiplier value.
    ///
    /// The value is quantized to `round(value * 2^scale_bits)`.
    pub fn set_factor_real(&mut self, name: &str, value: f64) -> Result<(), FilterError> {
        let id = self.lookup(name)?;
        let node = &mut self.nodes[id.index() as usize];
        let found = node.kind();
        match &mut node.state {
            NodeState::Multiplier { coeff, .. } => coeff.set_factor_real(value),
            _ => Err(FilterError::TypeMismatch {
                name: name.to_string(),
                expected: NodeKind::Multiplier,
                found,
            }),
        }
    }

    // --- Introspection ---

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if a node with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    // --- Sealing ---

    /// Validates the topology and seals the graph into a runnable [`Filter`].
    ///
    /// `input` names the constant node that receives fed samples; `output`
    /// names the node whose value each step produces. Fails if:
    /// - either name is unknown
    /// - the input node is not a constant
    /// - any node has unwired input slots
    /// - a feedback cycle contains no delay register
    pub fn into_filter(self, input: &str, output: &str) -> Result<Filter, FilterError> {
        let input_id = self.lookup(input)?;
        let input_kind = self.nodes[input_id.index() as usize].kind();
        if input_kind != NodeKind::Constant {
            return Err(FilterError::TypeMismatch {
                name: input.to_string(),
                expected: NodeKind::Constant,
                found: input_kind,
            });
        }
        let output_id = self.lookup(output)?;

        for node in &self.nodes {
            if node.inputs.len() != node.kind().arity() {
                return Err(FilterError::NotConnected(node.name.clone()));
            }
        }

        self.check_combinational_loops()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_build: '{input}' -> '{output}', {} nodes",
            self.nodes.len()
        );

        Ok(Filter::from_graph(self.nodes, input_id, output_id))
    }

    // --- Internals ---

    fn add_node(&mut self, name: &str, bits: u32, state: NodeState) -> Result<NodeId, FilterError> {
        if !word::width_is_valid(bits) {
            return Err(FilterError::WidthOutOfRange(bits));
        }
        if self.contains(name) {
            return Err(FilterError::DuplicateName(name.to_string()));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(name.to_string(), bits, state));
        Ok(id)
    }

    fn lookup(&self, name: &str) -> Result<NodeId, FilterError> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
            .ok_or_else(|| FilterError::UnknownName(name.to_string()))
    }

    /// Rejects cycles made only of adders and multipliers.
    ///
    /// Evaluation recurses through adder and multiplier inputs and bottoms
    /// out at constants and delay registers, so a cycle is harmless exactly
    /// when a delay sits on it. Kahn's algorithm over the subgraph of
    /// combinational nodes finds any all-combinational cycle.
    fn check_combinational_loops(&self) -> Result<(), FilterError> {
        let n = self.nodes.len();
        let combinational = |idx: usize| {
            matches!(
                self.nodes[idx].kind(),
                NodeKind::Adder | NodeKind::Multiplier
            )
        };

        let mut in_degree = vec![0u32; n];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut remaining = 0usize;

        for (i, node) in self.nodes.iter().enumerate() {
            if !combinational(i) {
                continue;
            }
            remaining += 1;
            for input in &node.inputs {
                let j = input.index() as usize;
                if combinational(j) {
                    successors[j].push(i);
                    in_degree[i] += 1;
                }
            }
        }

        let mut queue: Vec<usize> = (0..n)
            .filter(|&i| combinational(i) && in_degree[i] == 0)
            .collect();

        while let Some(idx) = queue.pop() {
            remaining -= 1;
            for &succ in &successors[idx] {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    queue.push(succ);
                }
            }
        }

        if remaining > 0 {
            // Every node left with a nonzero in-degree sits on or behind a
            // combinational cycle; report the first one by insertion order.
            let idx = (0..n)
                .find(|&i| combinational(i) && in_degree[i] > 0)
                .unwrap_or(0);
            return Err(FilterError::CombinationalLoop(
                self.nodes[idx].name.clone(),
            ));
        }
        Ok(())
    }
}
