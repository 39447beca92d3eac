//! Sealed filter evaluation engine.
//!
//! A [`Filter`] owns the node arena built by
//! [`FilterGraph`](crate::FilterGraph) and runs it one sample at a time.
//! Each [`feed`](Filter::feed) performs three steps in hardware order:
//!
//! 1. **update** - every delay register samples its input from the running
//!    network, then all registers latch simultaneously
//! 2. **set** - the new sample is stored into the input constant
//! 3. **read** - the output node is evaluated combinationally
//!
//! Evaluation recurses through adder and multiplier inputs and bottoms out
//! at constants and delay registers. A register read never recurses, which
//! is what makes feedback cycles through delays well defined.

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::coeff::Coefficient;
use crate::error::FilterError;
use crate::node::{NodeData, NodeId, NodeKind, NodeState};
use crate::sequence::{self, ResponseStream};
use crate::word;

/// Snapshot of one node's most recent evaluation, as reported by
/// [`Filter::status`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStatus {
    /// Node name.
    pub name: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Width-reduced output value.
    pub value: i64,
    /// Unreduced arithmetic result (equals `value` unless the node
    /// overflowed).
    pub raw: i64,
    /// Whether the evaluation left the node's word range.
    pub overflow: bool,
}

impl core::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if !self.overflow {
            return write!(f, "returning {}", self.value);
        }
        match self.kind {
            NodeKind::Multiplier => {
                write!(f, "OVERFLOW: {} saturated to {}", self.raw, self.value)
            }
            _ => write!(f, "OVERFLOW: {} wrapped to {}", self.raw, self.value),
        }
    }
}

/// Borrowed view of one node's topology, as reported by [`Filter::nodes`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo<'a> {
    /// Node name.
    pub name: &'a str,
    /// Node kind.
    pub kind: NodeKind,
    /// Word width in bits.
    pub bits: u32,
    /// Names of the wired inputs, in slot order.
    pub inputs: Vec<&'a str>,
}

/// A sealed, runnable fixed-point filter.
///
/// Built by [`FilterGraph::into_filter`](crate::FilterGraph::into_filter);
/// the topology is fixed, while sample values, coefficients, and word widths
/// stay adjustable.
#[derive(Debug)]
pub struct Filter {
    nodes: Vec<NodeData>,
    input: NodeId,
    output: NodeId,
    /// Delay registers in insertion order, cached for the update phases.
    delays: Vec<NodeId>,
    /// Multipliers in insertion order, cached for coefficient sweeps.
    multipliers: Vec<NodeId>,
}

impl Filter {
    pub(crate) fn from_graph(nodes: Vec<NodeData>, input: NodeId, output: NodeId) -> Self {
        let delays = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind() == NodeKind::Delay)
            .map(|(i, _)| NodeId(i as u32))
            .collect();
        let multipliers = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind() == NodeKind::Multiplier)
            .map(|(i, _)| NodeId(i as u32))
            .collect();
        Self {
            nodes,
            input,
            output,
            delays,
            multipliers,
        }
    }

    // --- Sample path ---

    /// Advances the filter by one step and returns the output sample.
    ///
    /// Fails with [`FilterError::Overflow`] if `value` does not fit the
    /// input node's width, or if a stale register value no longer fits
    /// after [`set_bits`](Self::set_bits).
    pub fn feed(&mut self, value: i64) -> Result<i64, FilterError> {
        self.update()?;
        self.set_input(value)?;
        self.eval(self.output)
    }

    /// Advances the filter by one step in the normalized real domain.
    ///
    /// The input is scaled by `2^(bits-1)` of the input node and truncated
    /// toward zero; the output is divided by `2^(bits-1)` of the output
    /// node, so full scale maps to the interval [-1, 1).
    pub fn feed_normalized(&mut self, value: f64) -> Result<f64, FilterError> {
        let in_bits = self.nodes[self.input.index() as usize].bits;
        let out_bits = self.nodes[self.output.index() as usize].bits;
        let scaled = value * (1i64 << (in_bits - 1)) as f64;
        let out = self.feed(scaled as i64)?;
        Ok(out as f64 / (1i64 << (out_bits - 1)) as f64)
    }

    /// Zeroes the input constant and every delay register.
    ///
    /// Word widths and coefficients are left untouched. Overflow flags are
    /// cleared.
    pub fn reset(&mut self) {
        let input = self.input.index() as usize;
        if let NodeState::Constant { value } = &mut self.nodes[input].state {
            *value = 0;
        }
        for node in &mut self.nodes {
            match &mut node.state {
                NodeState::Delay { current, pending } => {
                    *current = 0;
                    *pending = 0;
                }
                NodeState::Adder { overflow } | NodeState::Multiplier { overflow, .. } => {
                    *overflow = false;
                }
                NodeState::Constant { .. } => {}
            }
        }
    }

    // --- Response helpers ---

    /// Returns a resetting, zero-extending iterator over `length` output
    /// samples for the given input data.
    ///
    /// The filter is reset up front. Once `data` runs out, zeros are fed,
    /// which is what makes infinite impulse responses visible beyond the
    /// input. A feed error ends the stream.
    pub fn stream<'a>(&'a mut self, data: &'a [i64], length: usize) -> ResponseStream<'a> {
        ResponseStream::new(self, data, length)
    }

    /// Computes `length` output samples for the given input data.
    ///
    /// Equivalent to collecting [`stream`](Self::stream).
    pub fn response(&mut self, data: &[i64], length: usize) -> Result<Vec<i64>, FilterError> {
        self.stream(data, length).collect()
    }

    /// Computes `length` normalized output samples for normalized input
    /// data, feeding zeros once `data` runs out.
    pub fn response_normalized(
        &mut self,
        data: &[f64],
        length: usize,
    ) -> Result<Vec<f64>, FilterError> {
        self.reset();
        let mut out = Vec::with_capacity(length);
        for n in 0..length {
            let x = data.get(n).copied().unwrap_or(0.0);
            out.push(self.feed_normalized(x)?);
        }
        Ok(out)
    }

    /// Computes `length` samples of the filter's response to the canonical
    /// unit pulse (largest positive input value at step 0, zeros after).
    pub fn impulse_response(&mut self, length: usize) -> Result<Vec<i64>, FilterError> {
        let bits = self.nodes[self.input.index() as usize].bits;
        let pulse = sequence::unit_pulse(bits, 1);
        self.response(&pulse, length)
    }

    /// Normalized-domain variant of [`impulse_response`](Self::impulse_response).
    ///
    /// The pulse amplitude is `(2^(bits-1) - 1) / 2^(bits-1)`, the largest
    /// representable normalized value.
    pub fn impulse_response_normalized(
        &mut self,
        length: usize,
    ) -> Result<Vec<f64>, FilterError> {
        let bits = self.nodes[self.input.index() as usize].bits;
        let pulse = sequence::unit_pulse_normalized(bits, 1);
        self.response_normalized(&pulse, length)
    }

    /// Returns the canonical unit pulse for this filter's input width.
    pub fn unit_pulse(&self, length: usize) -> Vec<i64> {
        let bits = self.nodes[self.input.index() as usize].bits;
        sequence::unit_pulse(bits, length)
    }

    // --- Introspection ---

    /// Name of the input constant.
    pub fn input_name(&self) -> &str {
        &self.nodes[self.input.index() as usize].name
    }

    /// Name of the output node.
    pub fn output_name(&self) -> &str {
        &self.nodes[self.output.index() as usize].name
    }

    /// Number of nodes in the filter.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Describes every node's topology, in insertion order.
    pub fn nodes(&self) -> Vec<NodeInfo<'_>> {
        self.nodes
            .iter()
            .map(|node| NodeInfo {
                name: &node.name,
                kind: node.kind(),
                bits: node.bits,
                inputs: node
                    .inputs
                    .iter()
                    .map(|id| self.nodes[id.index() as usize].name.as_str())
                    .collect(),
            })
            .collect()
    }

    /// Re-evaluates every node at the current step and reports name, kind,
    /// output value, raw result, and overflow flag, in insertion order.
    ///
    /// Does not advance the filter.
    pub fn status(&mut self) -> Result<Vec<NodeStatus>, FilterError> {
        let mut report = Vec::with_capacity(self.nodes.len());
        for i in 0..self.nodes.len() {
            let (raw, value) = self.eval_raw(NodeId(i as u32))?;
            let node = &self.nodes[i];
            report.push(NodeStatus {
                name: node.name.clone(),
                kind: node.kind(),
                value,
                raw,
                overflow: node.overflowed(),
            });
        }
        Ok(report)
    }

    /// Returns the named node's overflow flag from its most recent
    /// evaluation. Constants and delays always report `false`.
    pub fn overflowed(&self, name: &str) -> Result<bool, FilterError> {
        let id = self.lookup(name)?;
        Ok(self.nodes[id.index() as usize].overflowed())
    }

    // --- Word width ---

    /// Returns the word width shared by all nodes.
    ///
    /// Fails with [`FilterError::NonUniform`] if the nodes disagree.
    pub fn bits(&self) -> Result<u32, FilterError> {
        let first = self.nodes[0].bits;
        if self.nodes.iter().any(|n| n.bits != first) {
            return Err(FilterError::NonUniform("bits"));
        }
        Ok(first)
    }

    /// Sets every node's word width.
    ///
    /// Register and constant contents are kept; a stale value that no
    /// longer fits the new width surfaces as [`FilterError::Overflow`] on
    /// the next step that consumes it.
    pub fn set_bits(&mut self, bits: u32) -> Result<(), FilterError> {
        if !word::width_is_valid(bits) {
            return Err(FilterError::WidthOutOfRange(bits));
        }
        for node in &mut self.nodes {
            node.bits = bits;
        }
        Ok(())
    }

    // --- Coefficients ---

    /// Returns the factor width shared by all multipliers, or `None` if the
    /// filter has no multipliers.
    ///
    /// Fails with [`FilterError::NonUniform`] if the multipliers disagree.
    pub fn factor_bits(&self) -> Result<Option<u32>, FilterError> {
        self.uniform_coeff_width("factor bits", Coefficient::factor_bits)
    }

    /// Returns the fractional scale shared by all multipliers, or `None` if
    /// the filter has no multipliers.
    ///
    /// Fails with [`FilterError::NonUniform`] if the multipliers disagree.
    pub fn scale_bits(&self) -> Result<Option<u32>, FilterError> {
        self.uniform_coeff_width("scale bits", Coefficient::scale_bits)
    }

    /// Re-quantizes every multiplier's coefficient to new widths, keeping
    /// each real multiplier value as closely as possible.
    ///
    /// Validates every coefficient before committing any: on error the
    /// filter is unchanged.
    pub fn set_factor_bits(
        &mut self,
        factor_bits: u32,
        scale_bits: u32,
    ) -> Result<(), FilterError> {
        let mut resized = Vec::with_capacity(self.multipliers.len());
        for &id in &self.multipliers {
            if let NodeState::Multiplier { coeff, .. } = &self.nodes[id.index() as usize].state {
                let mut candidate = *coeff;
                candidate.resize(factor_bits, scale_bits)?;
                resized.push(candidate);
            }
        }
        for (k, &id) in self.multipliers.iter().enumerate() {
            if let NodeState::Multiplier { coeff, .. } = &mut self.nodes[id.index() as usize].state
            {
                *coeff = resized[k];
            }
        }
        Ok(())
    }

    /// Returns the named multiplier's raw integer factor.
    pub fn factor(&self, name: &str) -> Result<i64, FilterError> {
        self.coefficient(name).map(|c| c.factor())
    }

    /// Returns the named multiplier's effective real multiplier.
    pub fn factor_real(&self, name: &str) -> Result<f64, FilterError> {
        self.coefficient(name).map(|c| c.factor_real())
    }

    /// Sets the named multiplier's raw integer factor.
    pub fn set_factor(&mut self, name: &str, factor: i64) -> Result<(), FilterError> {
        self.coefficient_mut(name)?.set_factor(factor)
    }

    /// Sets the named multiplier's factor from a real multiplier value.
    pub fn set_factor_real(&mut self, name: &str, value: f64) -> Result<(), FilterError> {
        self.coefficient_mut(name)?.set_factor_real(value)
    }

    /// Lists every multiplier's raw integer factor, in insertion order.
    pub fn factors(&self) -> Vec<(&str, i64)> {
        self.multipliers
            .iter()
            .filter_map(|id| {
                let node = &self.nodes[id.index() as usize];
                match &node.state {
                    NodeState::Multiplier { coeff, .. } => {
                        Some((node.name.as_str(), coeff.factor()))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    /// Lists every multiplier's effective real multiplier, in insertion
    /// order.
    pub fn factors_real(&self) -> Vec<(&str, f64)> {
        self.multipliers
            .iter()
            .filter_map(|id| {
                let node = &self.nodes[id.index() as usize];
                match &node.state {
                    NodeState::Multiplier { coeff, .. } => {
                        Some((node.name.as_str(), coeff.factor_real()))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    /// Returns a copy of the named multiplier's coefficient.
    pub fn coefficient(&self, name: &str) -> Result<Coefficient, FilterError> {
        let id = self.lookup(name)?;
        let node = &self.nodes[id.index() as usize];
        match &node.state {
            NodeState::Multiplier { coeff, .. } => Ok(*coeff),
            _ => Err(FilterError::TypeMismatch {
                name: node.name.clone(),
                expected: NodeKind::Multiplier,
                found: node.kind(),
            }),
        }
    }

    // --- Internals ---

    fn coefficient_mut(&mut self, name: &str) -> Result<&mut Coefficient, FilterError> {
        let id = self.lookup(name)?;
        let node = &mut self.nodes[id.index() as usize];
        let found = node.kind();
        match &mut node.state {
            NodeState::Multiplier { coeff, .. } => Ok(coeff),
            _ => Err(FilterError::TypeMismatch {
                name: node.name.clone(),
                expected: NodeKind::Multiplier,
                found,
            }),
        }
    }

    fn uniform_coeff_width(
        &self,
        what: &'static str,
        width: impl Fn(&Coefficient) -> u32,
    ) -> Result<Option<u32>, FilterError> {
        let mut common = None;
        for &id in &self.multipliers {
            if let NodeState::Multiplier { coeff, .. } = &self.nodes[id.index() as usize].state {
                let bits = width(coeff);
                match common {
                    None => common = Some(bits),
                    Some(c) if c != bits => return Err(FilterError::NonUniform(what)),
                    Some(_) => {}
                }
            }
        }
        Ok(common)
    }

    fn lookup(&self, name: &str) -> Result<NodeId, FilterError> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
            .ok_or_else(|| FilterError::UnknownName(name.into()))
    }

    fn set_input(&mut self, value: i64) -> Result<(), FilterError> {
        let idx = self.input.index() as usize;
        self.check_word(idx, value)?;
        if let NodeState::Constant { value: stored } = &mut self.nodes[idx].state {
            *stored = value;
        }
        Ok(())
    }

    /// Two-phase register update: sample every delay from the running
    /// network, then latch all pending values at once. Registers therefore
    /// read each other's pre-step values, like flip-flops on a shared clock
    /// edge, regardless of insertion order.
    fn update(&mut self) -> Result<(), FilterError> {
        for i in 0..self.delays.len() {
            let idx = self.delays[i].index() as usize;
            let source = self.nodes[idx].inputs[0];
            let value = self.eval(source)?;
            self.check_word(idx, value)?;
            if let NodeState::Delay { pending, .. } = &mut self.nodes[idx].state {
                *pending = value;
            }
        }
        for i in 0..self.delays.len() {
            let idx = self.delays[i].index() as usize;
            if let NodeState::Delay { current, pending } = &mut self.nodes[idx].state {
                *current = *pending;
            }
        }
        Ok(())
    }

    fn eval(&mut self, id: NodeId) -> Result<i64, FilterError> {
        Ok(self.eval_raw(id)?.1)
    }

    /// Evaluates one node, returning `(raw, value)`: the unreduced
    /// arithmetic result and the width-reduced output.
    fn eval_raw(&mut self, id: NodeId) -> Result<(i64, i64), FilterError> {
        let idx = id.index() as usize;
        match self.nodes[idx].state {
            NodeState::Constant { value } => Ok((value, value)),
            NodeState::Delay { current, .. } => Ok((current, current)),
            NodeState::Adder { .. } => {
                let (a_id, b_id) = (self.nodes[idx].inputs[0], self.nodes[idx].inputs[1]);
                let bits = self.nodes[idx].bits;
                let a = self.eval(a_id)?;
                let b = self.eval(b_id)?;
                self.check_word(idx, a)?;
                self.check_word(idx, b)?;
                let sum = a + b;
                let value = word::wrap(sum, bits);
                if let NodeState::Adder { overflow } = &mut self.nodes[idx].state {
                    *overflow = sum != value;
                }
                Ok((sum, value))
            }
            NodeState::Multiplier { coeff, .. } => {
                let source = self.nodes[idx].inputs[0];
                let bits = self.nodes[idx].bits;
                let x = self.eval(source)?;
                self.check_word(idx, x)?;
                let product = coeff.apply(x);
                let value = word::saturate(product, bits);
                if let NodeState::Multiplier { overflow, .. } = &mut self.nodes[idx].state {
                    *overflow = product != value;
                }
                Ok((product, value))
            }
        }
    }

    fn check_word(&self, idx: usize, value: i64) -> Result<(), FilterError> {
        let node = &self.nodes[idx];
        if word::overflows(value, node.bits) {
            return Err(FilterError::Overflow {
                name: node.name.clone(),
                value,
                bits: node.bits,
            });
        }
        Ok(())
    }
}
