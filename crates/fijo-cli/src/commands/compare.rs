//! Fixed-point vs. ideal comparison for a direct-form-II biquad.

use std::path::PathBuf;

use clap::Args;
use fijo_core::{BiquadCoeffs, direct_form2, ideal_response, max_value};

#[derive(Args)]
pub struct CompareArgs {
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

    /// Number of samples to compare
    #[arg(short, long, default_value = "32")]
    length: usize,

    /// Output detailed JSON report
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: CompareArgs) -> anyhow::Result<()> {
    let coeffs = BiquadCoeffs {
        b0: args.b0,
        b1: args.b1,
        b2: args.b2,
        a1: args.a1,
        a2: args.a2,
    };
    let mut filter = direct_form2(args.bits, args.factor_bits, args.scale_bits, &coeffs)?;

    let full_scale = max_value(args.bits);
    let scale = 1i64 << args.scale_bits;

    println!("Fixed-Point vs. Ideal");
    println!("=====================");
    println!("  Word width:   {} bits (full scale {})", args.bits, full_scale);
    println!("  Coefficients: {} bits, steps of 1/{}", args.factor_bits, scale);
    println!(
        "  Factors:      b0={}/{s}  b1={}/{s}  b2={}/{s}  a1={}/{s}  a2={}/{s}",
        args.b0,
        args.b1,
        args.b2,
        args.a1,
        args.a2,
        s = scale
    );
    println!();

    // Run the pulse by hand so per-step overflow flags can be sampled.
    let names: Vec<String> = filter
        .nodes()
        .iter()
        .map(|node| node.name.to_string())
        .collect();
    let mut overflow_counts = vec![0usize; names.len()];

    let pulse = filter.unit_pulse(1);
    filter.reset();
    let mut fixed = Vec::with_capacity(args.length);
    for n in 0..args.length {
        let x = pulse.get(n).copied().unwrap_or(0);
        fixed.push(filter.feed(x)?);
        for (name, count) in names.iter().zip(&mut overflow_counts) {
            if filter.overflowed(name)? {
                *count += 1;
            }
        }
    }

    let ideal = ideal_response(&coeffs, args.scale_bits, &[full_scale as f64], args.length);

    println!("Per-Sample Error");
    println!("----------------");
    println!("  {:>4}  {:>10}  {:>12}  {:>10}", "n", "fixed", "ideal", "error");
    println!("  {:>4}  {:>10}  {:>12}  {:>10}", "----", "-----", "-----", "-----");

    let mut max_error = 0.0f64;
    let mut error_sq_sum = 0.0f64;
    for (n, (&y, &y_ideal)) in fixed.iter().zip(&ideal).enumerate() {
        let error = y as f64 - y_ideal;
        max_error = max_error.max(error.abs());
        error_sq_sum += error * error;
        println!("  {:>4}  {:>10}  {:>12.3}  {:>10.3}", n, y, y_ideal, error);
    }
    let rms_error = (error_sq_sum / args.length.max(1) as f64).sqrt();
    println!();

    println!("Overflow");
    println!("--------");
    let flagged: Vec<(&str, usize)> = names
        .iter()
        .zip(&overflow_counts)
        .filter(|&(_, &count)| count > 0)
        .map(|(name, &count)| (name.as_str(), count))
        .collect();
    if flagged.is_empty() {
        println!("  No node overflowed.");
    } else {
        for (name, count) in &flagged {
            println!("  {:<12}  {} of {} steps", name, count, args.length);
        }
    }
    println!();

    println!("Summary");
    println!("-------");
    println!(
        "  Max error: {:.3} ({:.2}% of full scale)",
        max_error,
        100.0 * max_error / full_scale as f64
    );
    println!("  RMS error: {:.3}", rms_error);

    let quality = if !flagged.is_empty() {
        "Poor (overflow)"
    } else if max_error <= 1.0 {
        "Excellent"
    } else if max_error <= full_scale as f64 / 100.0 {
        "Good"
    } else if max_error <= full_scale as f64 / 20.0 {
        "Fair"
    } else {
        "Poor"
    };
    println!("  Match quality: {}", quality);
    println!(
        "  The fixed-point section {} the ideal recurrence.",
        if max_error <= 1.0 {
            "tracks"
        } else if max_error <= full_scale as f64 / 20.0 {
            "roughly tracks"
        } else {
            "diverges from"
        }
    );

    if let Some(output_path) = args.output {
        let overflow_report: serde_json::Map<String, serde_json::Value> = names
            .iter()
            .zip(&overflow_counts)
            .filter(|&(_, &count)| count > 0)
            .map(|(name, &count)| (name.clone(), serde_json::Value::from(count)))
            .collect();

        let report = serde_json::json!({
            "bits": args.bits,
            "factor_bits": args.factor_bits,
            "scale_bits": args.scale_bits,
            "factors": {
                "b0": args.b0,
                "b1": args.b1,
                "b2": args.b2,
                "a1": args.a1,
                "a2": args.a2,
            },
            "length": args.length,
            "pulse_amplitude": full_scale,
            "fixed": fixed,
            "ideal": ideal,
            "max_error": max_error,
            "rms_error": rms_error,
            "overflow_steps": overflow_report,
            "match_quality": quality,
        });

        std::fs::write(&output_path, serde_json::to_string_pretty(&report)?)?;
        println!("\nWrote detailed report to {}", output_path.display());
    }

    Ok(())
}
