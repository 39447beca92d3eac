//! Node table and width summary for a filter description.

use std::path::PathBuf;

use clap::Args;
use fijo_core::{max_value, min_value};

use super::common;

#[derive(Args)]
pub struct InfoArgs {
    /// Filter description file (native line format or TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let filter = common::load_filter(&args.config)?;

    println!("Filter: {}", args.config.display());
    println!();
    println!("  Input:  {}", filter.input_name());
    println!("  Output: {}", filter.output_name());
    println!();

    println!("  {:<12}  {:<10}  {:>4}  Inputs", "Name", "Kind", "Bits");
    println!("  {:<12}  {:<10}  {:>4}  ------", "----", "----", "----");
    for node in filter.nodes() {
        println!(
            "  {:<12}  {:<10}  {:>4}  {}",
            node.name,
            node.kind.as_str(),
            node.bits,
            node.inputs.join(", ")
        );
    }
    println!();

    match filter.bits() {
        Ok(bits) => println!(
            "  Word width:  {} bits ({} to {})",
            bits,
            min_value(bits),
            max_value(bits)
        ),
        Err(_) => println!("  Word width:  mixed"),
    }

    let factors = filter.factors();
    let reals = filter.factors_real();
    if !factors.is_empty() {
        match (filter.factor_bits(), filter.scale_bits()) {
            (Ok(Some(factor_bits)), Ok(Some(scale_bits))) => {
                println!("  Factor bits: {factor_bits}");
                println!(
                    "  Scale bits:  {scale_bits} (factors are multiples of 1/{})",
                    1i64 << scale_bits
                );
            }
            _ => println!("  Coefficient widths: mixed"),
        }
        println!();
        println!("  Coefficients:");
        for ((name, factor), (_, real)) in factors.into_iter().zip(reals) {
            println!("    {:<12}  {:>8}  ({real})", name, factor);
        }
    }

    Ok(())
}
