//! Filter description model and graph building.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::parse;
use fijo_core::{Filter, FilterGraph};

/// Node types as they appear in description files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Externally driven constant source.
    Const,
    /// Two-input wrapping adder.
    Add,
    /// One-input saturating coefficient multiplier.
    Multiply,
    /// One-register delay element.
    Delay,
}

impl NodeType {
    /// The type name as written in description files.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Const => "Const",
            NodeType::Add => "Add",
            NodeType::Multiply => "Multiply",
            NodeType::Delay => "Delay",
        }
    }

    /// Parses a type name from a description file.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "Const" => Ok(NodeType::Const),
            "Add" => Ok(NodeType::Add),
            "Multiply" => Ok(NodeType::Multiply),
            "Delay" => Ok(NodeType::Delay),
            other => Err(ConfigError::UnknownNodeType(other.to_string())),
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node declaration in a filter description.
///
/// Word width and, for multipliers, coefficient widths may be omitted when
/// the surrounding [`FilterSpec`] provides global defaults. The `factor` is
/// the real (normalized) multiplier value, quantized at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    /// Node type.
    pub node: NodeType,

    /// Unique node name.
    pub name: String,

    /// Word width, falling back to the global default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits: Option<u32>,

    /// Names of upstream nodes, in input order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connect: Vec<String>,

    /// Multiplier factor width, falling back to the global default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_bits: Option<u32>,

    /// Multiplier fractional scale, falling back to the global default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_bits: Option<u32>,

    /// Real multiplier value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,

    /// Marks this node as the filter input (must be a `Const`).
    #[serde(default, skip_serializing_if = "is_false")]
    pub input: bool,

    /// Marks this node as the filter output.
    #[serde(default, skip_serializing_if = "is_false")]
    pub output: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl NodeSpec {
    /// Create a new node declaration.
    pub fn new(node: NodeType, name: impl Into<String>) -> Self {
        Self {
            node,
            name: name.into(),
            bits: None,
            connect: Vec::new(),
            factor_bits: None,
            scale_bits: None,
            factor: None,
            input: false,
            output: false,
        }
    }

    /// Set an explicit word width.
    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = Some(bits);
        self
    }

    /// Set the upstream connections.
    pub fn with_connect(mut self, inputs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.connect = inputs.into_iter().map(Into::into).collect();
        self
    }

    /// Set an explicit factor width.
    pub fn with_factor_bits(mut self, factor_bits: u32) -> Self {
        self.factor_bits = Some(factor_bits);
        self
    }

    /// Set an explicit fractional scale.
    pub fn with_scale_bits(mut self, scale_bits: u32) -> Self {
        self.scale_bits = Some(scale_bits);
        self
    }

    /// Set the real multiplier value.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = Some(factor);
        self
    }

    /// Mark this node as the filter input.
    pub fn as_input(mut self) -> Self {
        self.input = true;
        self
    }

    /// Mark this node as the filter output.
    pub fn as_output(mut self) -> Self {
        self.output = true;
        self
    }
}

/// A complete filter description.
///
/// Descriptions are stored either in the native line-oriented text format or
/// as TOML; [`load`](FilterSpec::load) and [`save`](FilterSpec::save)
/// dispatch on the `.toml` extension.
///
/// # Text format
///
/// ```text
/// bits_global=9, factor_bits_global=9, scale_bits_global=7
///
/// node=Const,     name=x,  input
/// node=Add,       name=acc, connect=x m, output
/// node=Delay,     name=d,  connect=acc
/// node=Multiply,  name=m,  connect=d, factor=0.5
/// ```
///
/// # TOML format
///
/// ```toml
/// bits = 9
/// factor_bits = 9
/// scale_bits = 7
///
/// [[nodes]]
/// node = "Const"
/// name = "x"
/// input = true
///
/// [[nodes]]
/// node = "Delay"
/// name = "d"
/// connect = ["x"]
/// output = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    /// Global default word width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits: Option<u32>,

    /// Global default factor width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_bits: Option<u32>,

    /// Global default fractional scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_bits: Option<u32>,

    /// Node declarations, in file order.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

impl FilterSpec {
    /// Create an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global default word width.
    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = Some(bits);
        self
    }

    /// Set the global default factor width.
    pub fn with_factor_bits(mut self, factor_bits: u32) -> Self {
        self.factor_bits = Some(factor_bits);
        self
    }

    /// Set the global default fractional scale.
    pub fn with_scale_bits(mut self, scale_bits: u32) -> Self {
        self.scale_bits = Some(scale_bits);
        self
    }

    /// Add a node declaration.
    pub fn with_node(mut self, node: NodeSpec) -> Self {
        self.nodes.push(node);
        self
    }

    /// Load a description from a file, dispatching on the extension:
    /// `.toml` is parsed as TOML, anything else as the native text format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        if is_toml(path) {
            Self::from_toml(&content)
        } else {
            Self::from_text(&content)
        }
    }

    /// Save the description to a file, dispatching on the extension like
    /// [`load`](Self::load).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            self.to_toml()?
        } else {
            self.to_text()
        };
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Parse a description from the native text format.
    pub fn from_text(text: &str) -> Result<Self, ConfigError> {
        parse::parse_text(text)
    }

    /// Render the description in the native text format.
    pub fn to_text(&self) -> String {
        parse::write_text(self)
    }

    /// Parse a description from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the description to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build the described filter.
    ///
    /// Creates every node with widths resolved against the global defaults,
    /// wires the declared connections, quantizes the declared factors, and
    /// seals the graph around the input/output markers. Any structural
    /// problem propagates immediately; there is no partial construction.
    pub fn build(&self) -> Result<Filter, ConfigError> {
        let mut graph = FilterGraph::new();

        for spec in &self.nodes {
            let bits = self.resolve(spec, spec.bits, "bits", self.bits)?;
            match spec.node {
                NodeType::Const => graph.add_constant(&spec.name, bits)?,
                NodeType::Add => graph.add_adder(&spec.name, bits)?,
                NodeType::Delay => graph.add_delay(&spec.name, bits)?,
                NodeType::Multiply => {
                    let factor_bits =
                        self.resolve(spec, spec.factor_bits, "factor_bits", self.factor_bits)?;
                    let scale_bits =
                        self.resolve(spec, spec.scale_bits, "scale_bits", self.scale_bits)?;
                    graph.add_multiplier(&spec.name, bits, factor_bits, scale_bits)?
                }
            };
        }

        for spec in &self.nodes {
            if !spec.connect.is_empty() {
                let inputs: Vec<&str> = spec.connect.iter().map(String::as_str).collect();
                graph.connect(&spec.name, &inputs)?;
            }
        }

        for spec in &self.nodes {
            if let Some(factor) = spec.factor {
                graph.set_factor_real(&spec.name, factor)?;
            }
        }

        let input = self.marked_node("input", |n| n.input)?;
        let output = self.marked_node("output", |n| n.output)?;
        Ok(graph.into_filter(input, output)?)
    }

    fn resolve(
        &self,
        spec: &NodeSpec,
        local: Option<u32>,
        field: &'static str,
        global: Option<u32>,
    ) -> Result<u32, ConfigError> {
        local.or(global).ok_or_else(|| ConfigError::MissingField {
            node: spec.name.clone(),
            field,
        })
    }

    fn marked_node(
        &self,
        role: &'static str,
        marked: impl Fn(&NodeSpec) -> bool,
    ) -> Result<&str, ConfigError> {
        let mut found = None;
        for spec in self.nodes.iter().filter(|n| marked(n)) {
            if found.is_some() {
                return Err(if role == "input" {
                    ConfigError::MultipleInputs
                } else {
                    ConfigError::MultipleOutputs
                });
            }
            found = Some(spec.name.as_str());
        }
        found.ok_or(if role == "input" {
            ConfigError::NoInput
        } else {
            ConfigError::NoOutput
        })
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaky_integrator_spec() -> FilterSpec {
        FilterSpec::new()
            .with_bits(9)
            .with_factor_bits(9)
            .with_scale_bits(7)
            .with_node(NodeSpec::new(NodeType::Const, "x").as_input())
            .with_node(
                NodeSpec::new(NodeType::Add, "acc")
                    .with_connect(["x", "m"])
                    .as_output(),
            )
            .with_node(NodeSpec::new(NodeType::Delay, "d").with_connect(["acc"]))
            .with_node(
                NodeSpec::new(NodeType::Multiply, "m")
                    .with_connect(["d"])
                    .with_factor(0.5),
            )
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
bits = 9
factor_bits = 9
scale_bits = 7

[[nodes]]
node = "Const"
name = "x"
input = true

[[nodes]]
node = "Delay"
name = "d"
connect = ["x"]
output = true
"#;

        let spec = FilterSpec::from_toml(toml).unwrap();
        assert_eq!(spec.bits, Some(9));
        assert_eq!(spec.factor_bits, Some(9));
        assert_eq!(spec.scale_bits, Some(7));
        assert_eq!(spec.nodes.len(), 2);
        assert_eq!(spec.nodes[0].node, NodeType::Const);
        assert!(spec.nodes[0].input);
        assert_eq!(spec.nodes[1].connect, ["x"]);
        assert!(spec.nodes[1].output);
    }

    #[test]
    fn test_to_toml() {
        let toml = leaky_integrator_spec().to_toml().unwrap();
        assert!(toml.contains("bits = 9"));
        assert!(toml.contains("[[nodes]]"));
        assert!(toml.contains("node = \"Multiply\""));
        assert!(toml.contains("factor = 0.5"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let original = leaky_integrator_spec();
        let toml = original.to_toml().unwrap();
        let parsed = FilterSpec::from_toml(&toml).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_minimal_toml() {
        let toml = r#"
[[nodes]]
node = "Const"
name = "x"
bits = 4
input = true
output = true
"#;
        let spec = FilterSpec::from_toml(toml).unwrap();
        assert_eq!(spec.bits, None);
        assert_eq!(spec.nodes.len(), 1);
        assert_eq!(spec.nodes[0].bits, Some(4));
    }

    #[test]
    fn test_unknown_toml_field_rejected() {
        let toml = r#"
[[nodes]]
node = "Const"
name = "x"
bots = 9
"#;
        let err = FilterSpec::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_text_roundtrip() {
        let original = leaky_integrator_spec();
        let text = original.to_text();
        let parsed = FilterSpec::from_text(&text).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_build_leaky_integrator() {
        let mut filter = leaky_integrator_spec().build().unwrap();
        assert_eq!(filter.input_name(), "x");
        assert_eq!(filter.output_name(), "acc");
        assert_eq!(filter.factor("m").unwrap(), 64);
        assert_eq!(filter.impulse_response(3).unwrap(), [255, 127, 63]);
    }

    #[test]
    fn test_build_per_node_bits_override_global() {
        let spec = FilterSpec::new()
            .with_bits(9)
            .with_node(
                NodeSpec::new(NodeType::Const, "x")
                    .with_bits(4)
                    .as_input(),
            )
            .with_node(
                NodeSpec::new(NodeType::Delay, "d")
                    .with_bits(4)
                    .with_connect(["x"])
                    .as_output(),
            );
        let filter = spec.build().unwrap();
        assert_eq!(filter.bits().unwrap(), 4);
    }

    #[test]
    fn test_build_missing_bits() {
        let spec = FilterSpec::new()
            .with_node(NodeSpec::new(NodeType::Const, "x").as_input().as_output());
        let err = spec.build().unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingField { ref node, field: "bits" } if node == "x")
        );
    }

    #[test]
    fn test_build_missing_factor_bits() {
        let spec = FilterSpec::new()
            .with_bits(9)
            .with_node(NodeSpec::new(NodeType::Const, "x").as_input())
            .with_node(
                NodeSpec::new(NodeType::Multiply, "m")
                    .with_connect(["x"])
                    .as_output(),
            );
        let err = spec.build().unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingField { field: "factor_bits", .. }),
            "got: {err}"
        );
    }

    #[test]
    fn test_build_requires_exactly_one_input() {
        let no_input = FilterSpec::new()
            .with_bits(9)
            .with_node(NodeSpec::new(NodeType::Const, "x").as_output());
        assert!(matches!(
            no_input.build().unwrap_err(),
            ConfigError::NoInput
        ));

        let two_inputs = FilterSpec::new()
            .with_bits(9)
            .with_node(NodeSpec::new(NodeType::Const, "x").as_input())
            .with_node(NodeSpec::new(NodeType::Const, "y").as_input().as_output());
        assert!(matches!(
            two_inputs.build().unwrap_err(),
            ConfigError::MultipleInputs
        ));
    }

    #[test]
    fn test_build_requires_exactly_one_output() {
        let no_output = FilterSpec::new()
            .with_bits(9)
            .with_node(NodeSpec::new(NodeType::Const, "x").as_input());
        assert!(matches!(
            no_output.build().unwrap_err(),
            ConfigError::NoOutput
        ));
    }

    #[test]
    fn test_build_propagates_core_errors() {
        // Mismatched word widths are caught by the graph at connect time.
        let spec = FilterSpec::new()
            .with_node(NodeSpec::new(NodeType::Const, "x").with_bits(9).as_input())
            .with_node(
                NodeSpec::new(NodeType::Delay, "d")
                    .with_bits(12)
                    .with_connect(["x"])
                    .as_output(),
            );
        let err = spec.build().unwrap_err();
        assert!(
            matches!(
                err,
                ConfigError::Filter(fijo_core::FilterError::BitWidthMismatch { .. })
            ),
            "got: {err}"
        );
    }

    #[test]
    fn test_build_unwired_node_fails() {
        let spec = FilterSpec::new()
            .with_bits(9)
            .with_node(NodeSpec::new(NodeType::Const, "x").as_input())
            .with_node(NodeSpec::new(NodeType::Add, "a").as_output());
        let err = spec.build().unwrap_err();
        assert!(
            matches!(
                err,
                ConfigError::Filter(fijo_core::FilterError::NotConnected(_))
            ),
            "got: {err}"
        );
    }

    #[test]
    fn test_node_type_parse() {
        assert_eq!(NodeType::parse("Const").unwrap(), NodeType::Const);
        assert_eq!(NodeType::parse("Multiply").unwrap(), NodeType::Multiply);
        let err = NodeType::parse("Integrate").unwrap_err();
        assert_eq!(err.to_string(), "unknown node type: Integrate");
    }
}
