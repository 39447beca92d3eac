//! Arbitrary-sequence response of a filter description.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Args;

use super::common;

#[derive(Args)]
pub struct ResponseArgs {
    /// Filter description file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Comma-separated input samples, e.g. `255,-128,0`
    #[arg(long, value_name = "SAMPLES", conflicts_with = "data_file")]
    data: Option<String>,

    /// File with one input sample per line
    #[arg(long, value_name = "FILE")]
    data_file: Option<PathBuf>,

    /// Number of output samples (defaults to the input length)
    #[arg(short, long)]
    length: Option<usize>,

    /// Treat samples as fractions of full scale instead of raw integers
    #[arg(long)]
    normalized: bool,

    /// Print the response as a JSON report
    #[arg(long)]
    json: bool,
}

pub fn run(args: ResponseArgs) -> anyhow::Result<()> {
    let mut filter = common::load_filter(&args.config)?;

    if args.normalized {
        let data: Vec<f64> = load_data(&args)?;
        let length = args.length.unwrap_or(data.len());
        let response = filter.response_normalized(&data, length)?;

        if args.json {
            let report = serde_json::json!({
                "config": args.config.display().to_string(),
                "length": length,
                "normalized": true,
                "input": data,
                "response": response,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!(
            "Response of {} ({} samples, normalized):",
            args.config.display(),
            response.len()
        );
        println!();
        println!("  {:>4}  {:>12}  {:>12}", "n", "x[n]", "y[n]");
        println!("  {:>4}  {:>12}  {:>12}", "----", "--------", "--------");
        for (n, value) in response.iter().enumerate() {
            let x = data.get(n).copied().unwrap_or(0.0);
            println!("  {:>4}  {:>12.8}  {:>12.8}", n, x, value);
        }
        return Ok(());
    }

    let data: Vec<i64> = load_data(&args)?;
    let length = args.length.unwrap_or(data.len());
    let response = filter.response(&data, length)?;

    if args.json {
        let report = serde_json::json!({
            "config": args.config.display().to_string(),
            "length": length,
            "normalized": false,
            "input": data,
            "response": response,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Response of {} ({} samples):",
        args.config.display(),
        response.len()
    );
    println!();
    println!("  {:>4}  {:>12}  {:>12}", "n", "x[n]", "y[n]");
    println!("  {:>4}  {:>12}  {:>12}", "----", "--------", "--------");
    for (n, value) in response.iter().enumerate() {
        let x = data.get(n).copied().unwrap_or(0);
        println!("  {:>4}  {:>12}  {:>12}", n, x, value);
    }

    Ok(())
}

fn load_data<T: FromStr>(args: &ResponseArgs) -> anyhow::Result<Vec<T>> {
    if let Some(text) = &args.data {
        return common::parse_samples(text);
    }
    if let Some(path) = &args.data_file {
        return common::read_samples_file(path);
    }
    anyhow::bail!("no input data; pass --data or --data-file")
}
