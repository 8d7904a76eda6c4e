//! Monitor command
//!
//! Samples one account until the stop policy is met or Ctrl+C, then analyses
//! and exports whatever was collected.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use resmon_core::config::{
    SimulationConfig, DEFAULT_DURATION_SECS, DEFAULT_INTERVAL_MS, DEFAULT_MAX_DURATION_SECS,
    DEFAULT_NODE, DEFAULT_TARGET_TX, DEFAULT_TX_COST,
};
use resmon_core::{
    analyze, build_report, compare_analyses, load_report, save_report, shutdown_channel,
    simulate, Analysis, ComparisonRow, MonitorConfig, SampleEvent, Sampler, SimulationResult,
    SnapshotSink, StopPolicy, Termination, TronFetcher,
};

use super::Context;
use crate::output::console::{
    format_missed_line, format_snapshot_line, print_header, print_simulation, print_summary,
};
use crate::output::{print_comparison, print_info, print_json, print_warning, OutputFormat};

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// TRON account address (T...)
    #[arg(short, long, env = "RESMON_ADDRESS")]
    pub address: Option<String>,

    /// Full node URL
    #[arg(short, long, env = "RESMON_NODE", default_value = DEFAULT_NODE)]
    pub node: String,

    /// Sampling duration in seconds
    #[arg(short, long, default_value_t = DEFAULT_DURATION_SECS)]
    pub duration: u64,

    /// Sampling interval in milliseconds (minimum 100)
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval: u64,

    /// Sample until both used counters reach zero
    #[arg(long)]
    pub until_full: bool,

    /// Upper bound in seconds for --until-full
    #[arg(long, default_value_t = DEFAULT_MAX_DURATION_SECS)]
    pub max_duration: u64,

    /// Run the 24h transaction simulation after sampling
    #[arg(long)]
    pub simulate: bool,

    /// Energy cost per transaction for the simulation
    #[arg(long, default_value_t = DEFAULT_TX_COST)]
    pub tx_cost: i64,

    /// Daily transaction target for the simulation
    #[arg(long, default_value_t = DEFAULT_TARGET_TX)]
    pub target_tx: u32,

    /// Previous report to compare this session against
    #[arg(long)]
    pub compare: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl MonitorArgs {
    pub fn into_config(self) -> MonitorConfig {
        let policy = if self.until_full {
            StopPolicy::UntilFull {
                max_duration_secs: self.max_duration,
            }
        } else {
            StopPolicy::Fixed {
                duration_secs: self.duration,
            }
        };

        MonitorConfig {
            address: self.address.unwrap_or_default(),
            node: self.node,
            interval_ms: self.interval,
            policy,
            simulation: self.simulate.then_some(SimulationConfig {
                tx_cost: self.tx_cost,
                target_tx: self.target_tx,
            }),
            compare_file: self.compare,
            output_dir: self.output_dir,
        }
    }
}

/// Prints one line per attempt while sampling
struct LivePrinter {
    enabled: bool,
    recorded: u64,
}

impl SnapshotSink for LivePrinter {
    fn on_sample(&mut self, event: SampleEvent<'_>, _index: u64) {
        if !self.enabled {
            return;
        }
        match event {
            SampleEvent::Recorded(snapshot) => {
                println!("{}", format_snapshot_line(snapshot, self.recorded));
                self.recorded += 1;
            }
            SampleEvent::Missed { elapsed_ms, .. } => {
                println!("{}", format_missed_line(elapsed_ms).yellow());
            }
        }
    }
}

/// Machine-readable result of a session
#[derive(Debug, Serialize)]
struct MonitorOutput<'a> {
    report_file: Option<String>,
    termination: Termination,
    attempts: u64,
    missed: u64,
    analysis: &'a Analysis,
    simulation: Option<SimulationResult>,
    comparison: Option<Vec<ComparisonRow>>,
}

pub async fn execute(ctx: &Context, args: MonitorArgs) -> Result<()> {
    let config = args.into_config();
    config.validate()?;

    let live = ctx.format == OutputFormat::Table && !ctx.quiet;
    let start_time = Utc::now();
    if live {
        print_header(
            &config.address,
            &config.node,
            &config.policy,
            config.interval_ms,
            start_time,
        );
    }

    let fetcher = TronFetcher::new(&config.node);
    let sampler = Sampler::new(fetcher, config.address.clone(), config.sampler_config());

    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("[monitor] Ctrl+C received, stopping");
            trigger.trigger();
        }
    });

    let mut printer = LivePrinter {
        enabled: live,
        recorded: 0,
    };
    let outcome = sampler.run(&mut printer, shutdown).await;
    let end_time = Utc::now();

    if outcome.is_cancelled() {
        print_info("\n\nMonitoring interrupted by user.", ctx.quiet);
    }

    let status = outcome.status();
    let termination = outcome.termination;
    let (attempts, missed) = (outcome.attempts, outcome.missed);

    if outcome.snapshots.is_empty() {
        status?;
        anyhow::bail!("no samples recorded ({} of {} attempts failed)", missed, attempts);
    }

    let analysis = analyze(&outcome.snapshots);

    let simulation = match (&config.simulation, outcome.snapshots.last()) {
        (Some(sim), Some(last)) => Some(simulate(last, &analysis, sim.tx_cost, sim.target_tx)?),
        _ => None,
    };

    let report = build_report(
        &config.address,
        &config.node,
        start_time,
        end_time,
        config.interval_ms,
        outcome.snapshots,
        analysis,
    );

    let report_path = match save_report(&report, &config.output_dir) {
        Ok(path) => Some(path),
        Err(e) => {
            print_warning(&format!("Warning: failed to save report: {}", e));
            None
        }
    };

    let comparison = match &config.compare_file {
        Some(path) => compare_with(path, &report.analysis),
        None => None,
    };

    match ctx.format {
        OutputFormat::Table => {
            print_summary(&report.analysis, report_path.as_deref());
            if let Some(sim) = &simulation {
                print_simulation(sim);
            }
            if let (Some(path), Some(rows)) = (&config.compare_file, &comparison) {
                println!();
                println!("Comparison with: {}", path.display());
                print_comparison(rows, ctx.format)?;
            }
        }
        OutputFormat::Json => {
            print_json(&MonitorOutput {
                report_file: report_path.as_ref().map(|p| p.display().to_string()),
                termination,
                attempts,
                missed,
                analysis: &report.analysis,
                simulation,
                comparison,
            })?;
        }
    }

    // Export happens before a cancelled session reports failure
    status?;
    Ok(())
}

fn compare_with(path: &Path, current: &Analysis) -> Option<Vec<ComparisonRow>> {
    match load_report(path) {
        Ok(previous) => Some(compare_analyses(&previous.analysis, current)),
        Err(e) => {
            print_warning(&format!(
                "Warning: failed to compare with {}: {}",
                path.display(),
                e
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: MonitorArgs,
    }

    fn parse(argv: &[&str]) -> MonitorConfig {
        let mut full = vec!["monitor"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args.into_config()
    }

    const ADDRESS: &str = "TLyqzVGLV1srkB7dToTAEqgDSfPtXRJZYH";

    #[test]
    fn test_fixed_policy_from_flags() {
        let config = parse(&["-a", ADDRESS, "-d", "60", "-i", "3000", "-n", "http://node"]);

        assert_eq!(config.address, ADDRESS);
        assert_eq!(config.node, "http://node");
        assert_eq!(config.interval_ms, 3000);
        assert_eq!(config.policy, StopPolicy::Fixed { duration_secs: 60 });
        assert!(config.simulation.is_none());
        assert!(config.compare_file.is_none());
    }

    #[test]
    fn test_until_full_ignores_duration() {
        let config = parse(&["-a", ADDRESS, "-d", "60", "--until-full", "--max-duration", "600"]);
        assert_eq!(
            config.policy,
            StopPolicy::UntilFull {
                max_duration_secs: 600
            }
        );
    }

    #[test]
    fn test_simulation_flags() {
        let config = parse(&["-a", ADDRESS, "--simulate", "--tx-cost", "131000", "--target-tx", "50"]);
        let sim = config.simulation.unwrap();
        assert_eq!(sim.tx_cost, 131_000);
        assert_eq!(sim.target_tx, 50);

        let config = parse(&["-a", ADDRESS, "--tx-cost", "131000"]);
        assert!(config.simulation.is_none());
    }

    #[test]
    fn test_parsed_config_validates() {
        assert!(parse(&["-a", ADDRESS]).validate().is_ok());
        assert!(parse(&["-a", ADDRESS, "-i", "50"]).validate().is_err());
        assert!(parse(&["-a", ADDRESS, "-d", "0"]).validate().is_err());
    }
}
