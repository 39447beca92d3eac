//! Per-node evaluation dump after running a sequence.

use std::path::PathBuf;

use clap::Args;

use super::common;

#[derive(Args)]
pub struct StatusArgs {
    /// Filter description file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Comma-separated input samples to run before the dump
    #[arg(long, value_name = "SAMPLES")]
    data: Option<String>,
}

pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let mut filter = common::load_filter(&args.config)?;

    if let Some(text) = &args.data {
        let data: Vec<i64> = common::parse_samples(text)?;
        let mut outputs = Vec::with_capacity(data.len());
        for &x in &data {
            outputs.push(filter.feed(x)?.to_string());
        }
        println!(
            "Fed {} samples through {}; output: {}",
            data.len(),
            args.config.display(),
            outputs.join(", ")
        );
    } else {
        println!(
            "Initial state of {} (no samples fed):",
            args.config.display()
        );
    }
    println!();

    println!("  {:<12}  {:<10}  Last evaluation", "Name", "Kind");
    println!("  {:<12}  {:<10}  ---------------", "----", "----");
    for node in filter.status()? {
        println!("  {:<12}  {:<10}  {}", node.name, node.kind.as_str(), node);
    }

    Ok(())
}
