//! Impulse response of a filter description.

use std::path::PathBuf;

use clap::Args;

use super::common;

#[derive(Args)]
pub struct ImpulseArgs {
    /// Filter description file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Number of output samples
    #[arg(short, long, default_value = "32")]
    length: usize,

    /// Report samples as fractions of full scale instead of raw integers
    #[arg(long)]
    normalized: bool,

    /// Print the response as a JSON report
    #[arg(long)]
    json: bool,
}

pub fn run(args: ImpulseArgs) -> anyhow::Result<()> {
    let mut filter = common::load_filter(&args.config)?;

    if args.normalized {
        let response = filter.impulse_response_normalized(args.length)?;
        if args.json {
            let report = serde_json::json!({
                "config": args.config.display().to_string(),
                "length": args.length,
                "normalized": true,
                "response": response,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!(
            "Impulse response of {} ({} samples, normalized):",
            args.config.display(),
            response.len()
        );
        println!();
        println!("  {:>4}  {:>12}", "n", "y[n]");
        println!("  {:>4}  {:>12}", "----", "--------");
        for (n, value) in response.iter().enumerate() {
            println!("  {:>4}  {:>12.8}", n, value);
        }
        return Ok(());
    }

    let response = filter.impulse_response(args.length)?;
    if args.json {
        let report = serde_json::json!({
            "config": args.config.display().to_string(),
            "length": args.length,
            "normalized": false,
            "response": response,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let pulse = filter.unit_pulse(1)[0];
    println!(
        "Impulse response of {} (pulse amplitude {}, {} samples):",
        args.config.display(),
        pulse,
        response.len()
    );
    println!();
    println!("  {:>4}  {:>12}", "n", "y[n]");
    println!("  {:>4}  {:>12}", "----", "--------");
    for (n, value) in response.iter().enumerate() {
        println!("  {:>4}  {:>12}", n, value);
    }

    Ok(())
}
