//! The native line-oriented description format.
//!
//! One node per line as comma-separated `key=value` fields plus bare
//! `input`/`output` flags; `#` starts a comment. Global defaults
//! (`bits_global`, `factor_bits_global`, `scale_bits_global`) may appear in
//! any line's fields, each at most once across the file:
//!
//! ```text
//! bits_global=9, factor_bits_global=9, scale_bits_global=7
//!
//! # first-order section
//! node=Const,    name=x, input
//! node=Add,      name=acc, connect=x m, output
//! node=Delay,    name=d, connect=acc
//! node=Multiply, name=m, connect=d, factor=0.5
//! ```

use crate::error::ConfigError;
use crate::spec::{FilterSpec, NodeSpec, NodeType};

pub(crate) fn parse_text(text: &str) -> Result<FilterSpec, ConfigError> {
    let mut spec = FilterSpec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        parse_line(line, line_no, &mut spec)?;
    }
    Ok(spec)
}

pub(crate) fn write_text(spec: &FilterSpec) -> String {
    let mut out = String::new();

    let mut globals = Vec::new();
    if let Some(bits) = spec.bits {
        globals.push(format!("bits_global={bits}"));
    }
    if let Some(factor_bits) = spec.factor_bits {
        globals.push(format!("factor_bits_global={factor_bits}"));
    }
    if let Some(scale_bits) = spec.scale_bits {
        globals.push(format!("scale_bits_global={scale_bits}"));
    }
    if !globals.is_empty() {
        out.push_str(&globals.join(", "));
        out.push_str("\n\n");
    }

    for node in &spec.nodes {
        let mut parts = vec![format!("node={}", node.node), format!("name={}", node.name)];
        if let Some(bits) = node.bits {
            parts.push(format!("bits={bits}"));
        }
        if !node.connect.is_empty() {
            parts.push(format!("connect={}", node.connect.join(" ")));
        }
        if let Some(factor_bits) = node.factor_bits {
            parts.push(format!("factor_bits={factor_bits}"));
        }
        if let Some(scale_bits) = node.scale_bits {
            parts.push(format!("scale_bits={scale_bits}"));
        }
        if let Some(factor) = node.factor {
            parts.push(format!("factor={factor}"));
        }
        if node.input {
            parts.push("input".to_string());
        }
        if node.output {
            parts.push("output".to_string());
        }
        out.push_str(&parts.join(", "));
        out.push('\n');
    }
    out
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Fields of one line, collected before they become a node declaration.
#[derive(Default)]
struct LineFields {
    node: Option<NodeType>,
    name: Option<String>,
    bits: Option<u32>,
    connect: Option<Vec<String>>,
    factor_bits: Option<u32>,
    scale_bits: Option<u32>,
    factor: Option<f64>,
    input: bool,
    output: bool,
}

fn parse_line(line: &str, line_no: usize, spec: &mut FilterSpec) -> Result<(), ConfigError> {
    let mut fields = LineFields::default();
    for part in line.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(ConfigError::parse(line_no, "empty field"));
        }
        if let Some((key, value)) = part.split_once('=') {
            parse_pair(key.trim(), value.trim(), line_no, spec, &mut fields)?;
        } else {
            match part {
                "input" => set_flag(&mut fields.input, "input", line_no)?,
                "output" => set_flag(&mut fields.output, "output", line_no)?,
                other => {
                    return Err(ConfigError::parse(line_no, format!("unknown key '{other}'")));
                }
            }
        }
    }
    push_node(fields, line_no, spec)
}

fn parse_pair(
    key: &str,
    value: &str,
    line_no: usize,
    spec: &mut FilterSpec,
    fields: &mut LineFields,
) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::parse(
            line_no,
            format!("empty value for '{key}'"),
        ));
    }
    match key {
        "node" => set_field(&mut fields.node, key, NodeType::parse(value)?, line_no),
        "name" => set_field(&mut fields.name, key, value.to_string(), line_no),
        "bits" => {
            let bits = parse_number(key, value, line_no)?;
            set_field(&mut fields.bits, key, bits, line_no)
        }
        "connect" => {
            let names = value.split_whitespace().map(str::to_string).collect();
            set_field(&mut fields.connect, key, names, line_no)
        }
        "factor_bits" => {
            let factor_bits = parse_number(key, value, line_no)?;
            set_field(&mut fields.factor_bits, key, factor_bits, line_no)
        }
        "scale_bits" => {
            let scale_bits = parse_number(key, value, line_no)?;
            set_field(&mut fields.scale_bits, key, scale_bits, line_no)
        }
        "factor" => {
            let factor = value.parse::<f64>().map_err(|_| {
                ConfigError::parse(line_no, format!("invalid value for '{key}': '{value}'"))
            })?;
            set_field(&mut fields.factor, key, factor, line_no)
        }
        "bits_global" => {
            let bits = parse_number(key, value, line_no)?;
            set_global(&mut spec.bits, "bits_global", bits)
        }
        "factor_bits_global" => {
            let factor_bits = parse_number(key, value, line_no)?;
            set_global(&mut spec.factor_bits, "factor_bits_global", factor_bits)
        }
        "scale_bits_global" => {
            let scale_bits = parse_number(key, value, line_no)?;
            set_global(&mut spec.scale_bits, "scale_bits_global", scale_bits)
        }
        other => Err(ConfigError::parse(
            line_no,
            format!("unknown key '{other}'"),
        )),
    }
}

fn parse_number(key: &str, value: &str, line_no: usize) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| {
        ConfigError::parse(line_no, format!("invalid value for '{key}': '{value}'"))
    })
}

fn set_field<T>(
    slot: &mut Option<T>,
    key: &str,
    value: T,
    line_no: usize,
) -> Result<(), ConfigError> {
    if slot.is_some() {
        return Err(ConfigError::parse(line_no, format!("duplicate key '{key}'")));
    }
    *slot = Some(value);
    Ok(())
}

fn set_flag(slot: &mut bool, key: &str, line_no: usize) -> Result<(), ConfigError> {
    if *slot {
        return Err(ConfigError::parse(line_no, format!("duplicate key '{key}'")));
    }
    *slot = true;
    Ok(())
}

fn set_global(
    slot: &mut Option<u32>,
    key: &'static str,
    value: u32,
) -> Result<(), ConfigError> {
    if slot.is_some() {
        return Err(ConfigError::DuplicateGlobal(key));
    }
    *slot = Some(value);
    Ok(())
}

fn push_node(
    fields: LineFields,
    line_no: usize,
    spec: &mut FilterSpec,
) -> Result<(), ConfigError> {
    let declares_node = fields.node.is_some()
        || fields.name.is_some()
        || fields.bits.is_some()
        || fields.connect.is_some()
        || fields.factor_bits.is_some()
        || fields.scale_bits.is_some()
        || fields.factor.is_some()
        || fields.input
        || fields.output;
    if !declares_node {
        // The line carried only global defaults.
        return Ok(());
    }
    let Some(node) = fields.node else {
        return Err(ConfigError::parse(line_no, "node type not specified"));
    };
    let Some(name) = fields.name else {
        return Err(ConfigError::parse(line_no, "node name not specified"));
    };
    spec.nodes.push(NodeSpec {
        node,
        name,
        bits: fields.bits,
        connect: fields.connect.unwrap_or_default(),
        factor_bits: fields.factor_bits,
        scale_bits: fields.scale_bits,
        factor: fields.factor,
        input: fields.input,
        output: fields.output,
    });
    Ok(())
}
