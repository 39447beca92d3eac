//! Fijo CLI - command-line driver for the fijo fixed-point filter simulator.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fijo")]
#[command(author, version, about = "Fixed-point IIR filter simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the node table and word widths of a filter description
    Info(commands::info::InfoArgs),

    /// Compute the impulse response of a filter description
    Impulse(commands::impulse::ImpulseArgs),

    /// Run an input sequence through a filter description
    Response(commands::response::ResponseArgs),

    /// Run a sequence, then dump every node's last evaluation
    Status(commands::status::StatusArgs),

    /// Compare a fixed-point biquad against its ideal response
    Compare(commands::compare::CompareArgs),

    /// Print a multiplier transfer table over the full input domain
    Table(commands::table::TableArgs),

    /// Write a direct-form-II biquad description file
    Df2(commands::df2::Df2Args),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Impulse(args) => commands::impulse::run(args),
        Commands::Response(args) => commands::response::run(args),
        Commands::Status(args) => commands::status::run(args),
        Commands::Compare(args) => commands::compare::run(args),
        Commands::Table(args) => commands::table::run(args),
        Commands::Df2(args) => commands::df2::run(args),
    }
}
