//! Emit a direct-form-II biquad description file.

use std::path::PathBuf;

use clap::Args;
use fijo_config::{FilterSpec, NodeSpec, NodeType};

#[derive(Args)]
pub struct Df2Args {
    /// Word width in bits
    #[arg(long, default_value = "9")]
    bits: u32,

    /// Coefficient width in bits
    #[arg(long, default_value = "9")]
    factor_bits: u32,

    /// Fractional bits of the coefficient scale
    #[arg(long, default_value = "7")]
    scale_bits: u32,

    /// Feed-forward factor on w[n] (raw integer)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    b0: i64,

    /// Feed-forward factor on w[n-1] (raw integer)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    b1: i64,

    /// Feed-forward factor on w[n-2] (raw integer)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    b2: i64,

    /// Feedback factor on w[n-1] (raw integer)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    a1: i64,

    /// Feedback factor on w[n-2] (raw integer)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    a2: i64,

    /// Destination file; `.toml` writes TOML, anything else the line format
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

pub fn run(args: Df2Args) -> anyhow::Result<()> {
    let spec = biquad_spec(&args);

    // Reject bad widths and factors before anything is written.
    spec.build()?;
    spec.save(&args.output)?;

    println!(
        "Wrote {}-bit direct-form-II section to {}",
        args.bits,
        args.output.display()
    );
    Ok(())
}

fn biquad_spec(args: &Df2Args) -> FilterSpec {
    let scale = (1i64 << args.scale_bits) as f64;
    let real = |raw: i64| raw as f64 / scale;

    FilterSpec::new()
        .with_bits(args.bits)
        .with_factor_bits(args.factor_bits)
        .with_scale_bits(args.scale_bits)
        .with_node(NodeSpec::new(NodeType::Const, "x").as_input())
        .with_node(NodeSpec::new(NodeType::Add, "w").with_connect(["x", "fb"]))
        .with_node(NodeSpec::new(NodeType::Add, "fb").with_connect(["a1", "a2"]))
        .with_node(NodeSpec::new(NodeType::Add, "ff").with_connect(["b1", "b2"]))
        .with_node(
            NodeSpec::new(NodeType::Add, "y")
                .with_connect(["b0", "ff"])
                .as_output(),
        )
        .with_node(NodeSpec::new(NodeType::Delay, "d1").with_connect(["w"]))
        .with_node(NodeSpec::new(NodeType::Delay, "d2").with_connect(["d1"]))
        .with_node(
            NodeSpec::new(NodeType::Multiply, "b0")
                .with_connect(["w"])
                .with_factor(real(args.b0)),
        )
        .with_node(
            NodeSpec::new(NodeType::Multiply, "b1")
                .with_connect(["d1"])
                .with_factor(real(args.b1)),
        )
        .with_node(
            NodeSpec::new(NodeType::Multiply, "b2")
                .with_connect(["d2"])
                .with_factor(real(args.b2)),
        )
        .with_node(
            NodeSpec::new(NodeType::Multiply, "a1")
                .with_connect(["d1"])
                .with_factor(real(args.a1)),
        )
        .with_node(
            NodeSpec::new(NodeType::Multiply, "a2")
                .with_connect(["d2"])
                .with_factor(real(args.a2)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_args() -> Df2Args {
        Df2Args {
            bits: 9,
            factor_bits: 9,
            scale_bits: 7,
            b0: 128,
            b1: 0,
            b2: 0,
            a1: 64,
            a2: 0,
            output: PathBuf::from("unused.flt"),
        }
    }

    #[test]
    fn spec_builds_and_matches_the_programmatic_section() {
        let spec = biquad_spec(&default_args());
        let mut filter = spec.build().unwrap();

        assert_eq!(filter.node_count(), 12);
        assert_eq!(filter.input_name(), "x");
        assert_eq!(filter.output_name(), "y");
        assert_eq!(filter.factor("b0").unwrap(), 128);
        assert_eq!(filter.factor("a1").unwrap(), 64);

        let coeffs = fijo_core::BiquadCoeffs {
            b0: 128,
            a1: 64,
            ..Default::default()
        };
        let mut reference = fijo_core::direct_form2(9, 9, 7, &coeffs).unwrap();
        assert_eq!(
            filter.impulse_response(16).unwrap(),
            reference.impulse_response(16).unwrap()
        );
    }

    #[test]
    fn factors_round_trip_through_the_real_field() {
        let mut args = default_args();
        args.b1 = -37;
        args.a2 = 255;
        let spec = biquad_spec(&args);
        let filter = spec.build().unwrap();

        assert_eq!(filter.factor("b1").unwrap(), -37);
        assert_eq!(filter.factor("a2").unwrap(), 255);
    }
}
