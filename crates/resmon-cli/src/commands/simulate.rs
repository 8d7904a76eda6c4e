//! Simulate command
//!
//! Reruns the capacity simulation offline against a saved report.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use resmon_core::config::{DEFAULT_TARGET_TX, DEFAULT_TX_COST};
use resmon_core::{load_report, simulate};

use super::Context;
use crate::output::console::print_simulation;
use crate::output::{print_info, print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Report file written by `resmon monitor`
    pub report: PathBuf,

    /// Energy cost per transaction
    #[arg(long, default_value_t = DEFAULT_TX_COST)]
    pub tx_cost: i64,

    /// Daily transaction target
    #[arg(long, default_value_t = DEFAULT_TARGET_TX)]
    pub target_tx: u32,
}

pub async fn execute(ctx: &Context, args: SimulateArgs) -> Result<()> {
    let report = load_report(&args.report)
        .with_context(|| format!("failed to read report {}", args.report.display()))?;

    let last = report
        .snapshots
        .last()
        .ok_or_else(|| anyhow::anyhow!("report {} has no snapshots", args.report.display()))?;

    let sim = simulate(last, &report.analysis, args.tx_cost, args.target_tx)?;

    match ctx.format {
        OutputFormat::Table => {
            print_info(
                &format!(
                    "Simulating from {} ({} samples, last at T+{:.1}s)",
                    report.metadata.address,
                    report.metadata.samples_count,
                    last.elapsed_ms as f64 / 1000.0
                ),
                ctx.quiet,
            );
            print_simulation(&sim);
        }
        OutputFormat::Json => print_json(&sim)?,
    }

    Ok(())
}
