//! Multiplier transfer table over the full input domain.

use clap::Args;
use fijo_core::{Coefficient, max_value, min_value, saturate, width_is_valid};

#[derive(Args)]
pub struct TableArgs {
    /// Input and output word width in bits
    #[arg(long)]
    bits: u32,

    /// Coefficient width in bits
    #[arg(long)]
    factor_bits: u32,

    /// Fractional bits of the coefficient scale
    #[arg(long)]
    scale_bits: u32,

    /// Raw integer factor
    #[arg(long, allow_negative_numbers = true)]
    factor: i64,
}

pub fn run(args: TableArgs) -> anyhow::Result<()> {
    if !width_is_valid(args.bits) {
        anyhow::bail!("word width must be 2 to 32 bits, got {}", args.bits);
    }

    let mut coeff = Coefficient::new(args.factor_bits, args.scale_bits)?;
    coeff.set_factor(args.factor)?;

    println!(
        "# effective factor: {}/{}",
        coeff.factor(),
        1i64 << coeff.scale_bits()
    );
    for input in min_value(args.bits)..=max_value(args.bits) {
        println!("{:3}\t{:3}", input, saturate(coeff.apply(input), args.bits));
    }

    Ok(())
}
