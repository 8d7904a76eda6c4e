//! Session report export and comparison
//!
//! A report is a single pretty-printed JSON file holding the session
//! metadata, every recorded snapshot and the analysis. Saved reports can be
//! loaded back to rerun a simulation or to compare two sessions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Analysis, Metadata, MonitorReport, ResourceSnapshot};

/// Assemble a report from a finished session
///
/// `duration_seconds` comes from the analysed span, truncated, never below one.
pub fn build_report(
    address: &str,
    node: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    interval_ms: u64,
    snapshots: Vec<ResourceSnapshot>,
    analysis: Analysis,
) -> MonitorReport {
    let duration_seconds = (analysis.actual_duration_sec.max(0.0) as u64).max(1);

    MonitorReport {
        metadata: Metadata {
            address: address.to_string(),
            node: node.to_string(),
            start_time,
            end_time,
            duration_seconds,
            samples_count: snapshots.len(),
            interval_ms,
        },
        snapshots,
        analysis,
    }
}

/// File name for a report: `tron_monitor_<short address>_<YYYYMMDD_HHMMSS>.json`
pub fn report_filename(address: &str, start_time: DateTime<Utc>) -> String {
    let chars: Vec<char> = address.chars().collect();
    let short_addr = if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        address.to_string()
    };

    format!(
        "tron_monitor_{}_{}.json",
        short_addr,
        start_time.format("%Y%m%d_%H%M%S")
    )
}

/// Write `report` into `dir`, returning the path written
pub fn save_report(report: &MonitorReport, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(report_filename(
        &report.metadata.address,
        report.metadata.start_time,
    ));
    let data = serde_json::to_string_pretty(report)?;
    fs::write(&path, data)?;

    log::info!(
        "[report] Saved {} snapshots to {}",
        report.snapshots.len(),
        path.display()
    );
    Ok(path)
}

/// Read a report previously written by [`save_report`]
pub fn load_report(path: &Path) -> Result<MonitorReport> {
    let data = fs::read_to_string(path)?;
    let report = serde_json::from_str(&data)?;
    Ok(report)
}

/// One compared metric between two sessions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub metric: String,
    pub previous: f64,
    pub current: f64,
    pub delta: f64,
}

impl ComparisonRow {
    fn new(metric: &str, previous: f64, current: f64) -> Self {
        Self {
            metric: metric.to_string(),
            previous,
            current,
            delta: current - previous,
        }
    }
}

/// Compare the headline rates of two analyses
pub fn compare_analyses(previous: &Analysis, current: &Analysis) -> Vec<ComparisonRow> {
    vec![
        ComparisonRow::new(
            "energy_regen_rate_per_second",
            previous.energy_regen_rate_per_sec,
            current.energy_regen_rate_per_sec,
        ),
        ComparisonRow::new(
            "energy_consume_rate_per_second",
            previous.energy_consume_rate_per_sec,
            current.energy_consume_rate_per_sec,
        ),
        ComparisonRow::new(
            "bandwidth_regen_rate_per_second",
            previous.bandwidth_regen_rate_per_sec,
            current.bandwidth_regen_rate_per_sec,
        ),
        ComparisonRow::new(
            "tx_per_day_65k_energy",
            previous.tx_per_day_65k,
            current.tx_per_day_65k,
        ),
    ]
}
