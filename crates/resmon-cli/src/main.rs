//! resmon CLI - TRON account resource monitor
//!
//! Samples an account's Energy and Bandwidth from a full node, reports
//! regeneration and consumption rates, and projects transaction capacity.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "resmon")]
#[command(author, version, about = "TRON account resource monitor", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample an account's resources and analyse the series
    Monitor(commands::monitor::MonitorArgs),

    /// Rerun the 24h transaction simulation against a saved report
    Simulate(commands::simulate::SimulateArgs),

    /// Compare the headline rates of two saved reports
    Compare(commands::compare::CompareArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let ctx = commands::Context {
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Monitor(args) => commands::monitor::execute(&ctx, args).await,
        Commands::Simulate(args) => commands::simulate::execute(&ctx, args).await,
        Commands::Compare(args) => commands::compare::execute(&ctx, args).await,
    }
}
