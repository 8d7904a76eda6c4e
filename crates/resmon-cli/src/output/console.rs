//! Human-readable session output
//!
//! Live sample lines while monitoring, then the analysis summary, the
//! simulation and the session header.

use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;

use resmon_core::{Analysis, ResourceSnapshot, SimulationResult, StopPolicy};

use super::{format_delta, format_number, format_rate};

const RULE_WIDTH: usize = 100;
const SECTION_WIDTH: usize = 60;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

/// Session header printed before the first sample
pub fn print_header(
    address: &str,
    node: &str,
    policy: &StopPolicy,
    interval_ms: u64,
    start: DateTime<Utc>,
) {
    println!("{}", "TRON Resource Monitor".bold());
    println!("Address: {}", address);
    println!("Node: {}", node);
    match policy {
        StopPolicy::Fixed { duration_secs } => {
            println!("Duration: {} seconds (interval: {}ms)", duration_secs, interval_ms)
        }
        StopPolicy::UntilFull { max_duration_secs } => println!(
            "Duration: until fully recovered, at most {} seconds (interval: {}ms)",
            max_duration_secs, interval_ms
        ),
    }
    println!("Started: {}", start.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("{}", "=".repeat(RULE_WIDTH));
    println!();
}

/// One line per recorded sample; the first line carries no deltas
pub fn format_snapshot_line(snapshot: &ResourceSnapshot, index: u64) -> String {
    let elapsed_sec = snapshot.elapsed_ms as f64 / 1000.0;
    let mut line = format!(
        "[T+{:05.1}s] Energy: {} / {} (used: {}) | BW: {} / {} (used: {})",
        elapsed_sec,
        format_number(snapshot.energy_available),
        format_number(snapshot.energy_limit),
        format_number(snapshot.energy_used),
        format_number(snapshot.bandwidth_available),
        format_number(snapshot.total_bandwidth_limit()),
        format_number(snapshot.total_bandwidth_used()),
    );

    if index > 0 {
        line.push_str(&format!(
            " | ΔE: {} | ΔBW: {}",
            format_delta(snapshot.delta_energy),
            format_delta(snapshot.delta_bandwidth)
        ));
    }
    line
}

/// Line for an attempt whose fetch failed
pub fn format_missed_line(elapsed_ms: i64) -> String {
    format!("[T+{:05.1}s] sample missed", elapsed_ms as f64 / 1000.0)
}

/// Full analysis summary
pub fn print_summary(analysis: &Analysis, report_path: Option<&Path>) {
    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    println!(
        "{}",
        format!("SUMMARY ({:.1} seconds):", analysis.actual_duration_sec).bold()
    );

    println!();
    println!("  Energy Rates:");
    println!(
        "    Regeneration: {} /sec  ({} /day)",
        format_rate(analysis.energy_regen_rate_per_sec),
        format_number(analysis.energy_regen_rate_per_day as i64)
    );
    println!(
        "    Consumption:  {} /sec  ({} /day)",
        format_rate(analysis.energy_consume_rate_per_sec),
        format_number(analysis.energy_consume_rate_per_day as i64)
    );
    println!(
        "    Net:          {} /sec  ({} /day)",
        format_rate(analysis.energy_net_rate_per_sec),
        format_delta(analysis.energy_net_rate_per_day as i64)
    );

    println!();
    println!("  Bandwidth Rates:");
    println!(
        "    Regeneration: {} /sec  ({} /day)",
        format_rate(analysis.bandwidth_regen_rate_per_sec),
        format_number(analysis.bandwidth_regen_rate_per_day as i64)
    );
    println!(
        "    Consumption:  {} /sec  ({} /day)",
        format_rate(analysis.bandwidth_consume_rate_per_sec),
        format_number(analysis.bandwidth_consume_rate_per_day as i64)
    );
    println!(
        "    Net:          {} /sec  ({} /day)",
        format_rate(analysis.bandwidth_net_rate_per_sec),
        format_delta(analysis.bandwidth_net_rate_per_day as i64)
    );

    println!();
    println!("  Resource Totals:");
    println!(
        "    Energy:    regenerated {}, consumed {}, net {}",
        format_number(analysis.energy_regenerated),
        format_number(analysis.energy_consumed),
        format_delta(analysis.energy_total_delta)
    );
    println!(
        "    Bandwidth: regenerated {}, consumed {}, net {}",
        format_number(analysis.bandwidth_regenerated),
        format_number(analysis.bandwidth_consumed),
        format_delta(analysis.bandwidth_total_delta)
    );

    let tick = &analysis.tick_analysis;
    if tick.recovery_ticks > 0 || tick.consumption_events > 0 {
        println!();
        println!("  Block Tick Analysis:");
        println!(
            "    Recovery ticks: {} (avg interval: {:.1} sec, ~{:.0}/day)",
            tick.recovery_ticks, tick.avg_recovery_interval, tick.recovery_ticks_per_day
        );
        println!(
            "    Avg energy/tick: {}, bandwidth/tick: {:.1}",
            format_number(tick.energy_per_tick as i64),
            tick.bandwidth_per_tick
        );
        if tick.consumption_events > 0 {
            println!(
                "    Consumption events: {} (total: {} energy, {} bandwidth)",
                tick.consumption_events,
                format_number(tick.total_energy_consumed),
                format_number(tick.total_bandwidth_consumed)
            );
            println!(
                "    Avg per consumption: {} energy, {:.0} bandwidth",
                format_number(tick.avg_energy_per_consume as i64),
                tick.avg_bandwidth_per_consume
            );
        }
    }

    let used = &analysis.used_based_analysis;
    if used.energy_used_at_start > 0 {
        println!();
        println!("  Recovery Analysis:");
        println!(
            "    Energy used ratio: {:.1}% ({} / {})",
            used.energy_used_ratio * 100.0,
            format_number(used.energy_used_at_start),
            format_number(analysis.energy_start + used.energy_used_at_start)
        );
        println!(
            "    Bandwidth used ratio: {:.1}%",
            used.bandwidth_used_ratio * 100.0
        );
        if used.estimated_full_recovery_hours > 0.0 {
            println!(
                "    Estimated full recovery: {:.1} hours",
                used.estimated_full_recovery_hours
            );
        }
        println!(
            "    Measured regen: {:.1}/sec, used-based model: {:.1}/sec",
            used.measured_recovery_rate, used.used_based_recovery_rate
        );
        println!(
            "    Matches used-based model: {}",
            yes_no(used.energy_recovery_matches_used_model)
        );
    }

    let fit = &analysis.formula_validation;
    if let Some(best_fit) = fit.best_fit {
        println!();
        println!("  Formula Validation:");
        println!(
            "    Best fit model: {} (confidence: {:.1}%)",
            best_fit,
            fit.confidence * 100.0
        );
    }

    println!();
    println!("  Theoretical vs Measured (Regen Rate):");
    println!(
        "    Energy:    theoretical {}/day, measured {}/day, match: {}",
        format_number(analysis.theoretical_energy_rate_per_day as i64),
        format_number(analysis.energy_regen_rate_per_day as i64),
        yes_no(analysis.energy_rate_matches_theory)
    );
    println!(
        "    Bandwidth: theoretical {}/day, measured {}/day, match: {}",
        format_number(analysis.theoretical_bandwidth_rate_per_day as i64),
        format_number(analysis.bandwidth_regen_rate_per_day as i64),
        yes_no(analysis.bandwidth_rate_matches_theory)
    );

    let est = &analysis.practical_estimates;
    println!();
    println!("  Transaction Capacity (based on regen rate):");
    println!("    Immediate (from buffer):");
    println!("      At 65k Energy/tx:  {} tx", est.immediate_capacity_65k);
    println!("      At 131k Energy/tx: {} tx", est.immediate_capacity_131k);
    println!("    Sustained (regen only):");
    println!("      At 65k Energy/tx:  {:.0} tx/day", est.tx_per_day_65k_sustained);
    println!("      At 131k Energy/tx: {:.0} tx/day", est.tx_per_day_131k_sustained);
    println!("    With buffer (immediate + regen):");
    println!("      At 65k Energy/tx:  {:.0} tx/day", est.tx_per_day_65k_with_buffer);
    println!("      At 131k Energy/tx: {:.0} tx/day", est.tx_per_day_131k_with_buffer);

    if let Some(path) = report_path {
        println!();
        println!("Log saved to: {}", path.display());
    }
}

/// Simulation result with an abbreviated hourly projection
pub fn print_simulation(sim: &SimulationResult) {
    println!();
    println!("{}", "━".repeat(SECTION_WIDTH));
    println!(
        "{}",
        format!(
            "Transaction Simulation (target: {} tx @ {} energy each)",
            sim.target_tx,
            format_number(sim.tx_cost)
        )
        .bold()
    );
    println!("{}", "━".repeat(SECTION_WIDTH));

    println!("Current available: {} energy", format_number(sim.current_available));
    println!("Immediate capacity: {} tx", sim.immediate_capacity);
    println!();
    println!(
        "Recovery rate: {:.1} energy/sec = 1 tx every {:.1} sec",
        sim.recovery_rate_per_sec, sim.seconds_per_tx
    );
    println!();

    println!("Projection for next 24 hours:");
    for (hour, tx) in sim.hourly_projection.iter().enumerate() {
        if hour < 6 || hour >= 22 {
            println!("  Hour {:2}: {:4} tx", hour, tx);
        } else if hour == 6 {
            println!("  ...");
        }
    }
    println!();
    println!("Total 24h: {} tx", sim.total_24h_capacity);
    println!();

    if sim.can_reach_target {
        println!(
            "{}",
            format!("✓ Can reach target of {} tx/day", sim.target_tx).green()
        );
    } else {
        println!(
            "{}",
            format!("✗ Cannot reach {} tx/day with current resources", sim.target_tx).red()
        );
        println!();
        println!(
            "Required energy_limit for {} tx/day: {}",
            sim.target_tx,
            format_number(sim.required_energy_limit)
        );
    }
}
