//! Data models for the resource monitor
//!
//! Readings come from the fetcher, snapshots are built by the sampler, and
//! everything from [`Analysis`] down is derived once a session has ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Readings and Snapshots
// ============================================================================

/// One raw resource reading for an account, as returned by a fetcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReading {
    pub energy_limit: i64,
    pub energy_used: i64,
    /// Staked bandwidth allocation
    pub net_limit: i64,
    pub net_used: i64,
    /// Free daily bandwidth allocation
    pub free_net_limit: i64,
    pub free_net_used: i64,
}

/// A single timestamped, delta-annotated measurement of both resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub timestamp: DateTime<Utc>,
    /// Milliseconds since the sampling session started
    pub elapsed_ms: i64,

    // Energy
    pub energy_limit: i64,
    pub energy_used: i64,

    // Bandwidth
    pub net_limit: i64,
    pub net_used: i64,
    pub free_net_limit: i64,
    pub free_net_used: i64,

    // Computed
    pub energy_available: i64,
    pub bandwidth_available: i64,

    /// Change in available energy since the previous recorded snapshot
    pub delta_energy: i64,
    /// Change in available bandwidth since the previous recorded snapshot
    pub delta_bandwidth: i64,
}

impl ResourceSnapshot {
    /// Build a snapshot from a reading, diffing against the last recorded snapshot
    ///
    /// `previous` must be the last *recorded* snapshot; missed samples never
    /// become a baseline. The first snapshot of a session has zero deltas.
    pub fn from_reading(
        reading: RawReading,
        timestamp: DateTime<Utc>,
        elapsed_ms: i64,
        previous: Option<&ResourceSnapshot>,
    ) -> Self {
        let energy_available = reading.energy_limit - reading.energy_used;
        let bandwidth_available = (reading.net_limit + reading.free_net_limit)
            - (reading.net_used + reading.free_net_used);

        let (delta_energy, delta_bandwidth) = match previous {
            Some(prev) => (
                energy_available - prev.energy_available,
                bandwidth_available - prev.bandwidth_available,
            ),
            None => (0, 0),
        };

        Self {
            timestamp,
            elapsed_ms,
            energy_limit: reading.energy_limit,
            energy_used: reading.energy_used,
            net_limit: reading.net_limit,
            net_used: reading.net_used,
            free_net_limit: reading.free_net_limit,
            free_net_used: reading.free_net_used,
            energy_available,
            bandwidth_available,
            delta_energy,
            delta_bandwidth,
        }
    }

    /// Total bandwidth limit (staked + free)
    pub fn total_bandwidth_limit(&self) -> i64 {
        self.net_limit + self.free_net_limit
    }

    /// Total bandwidth used (staked + free)
    pub fn total_bandwidth_used(&self) -> i64 {
        self.net_used + self.free_net_used
    }

    /// Both raw `used` counters are back at zero
    ///
    /// This checks usage, not availability against the limit, so an account
    /// with nothing staked and nothing used counts as recovered immediately.
    pub fn is_fully_recovered(&self) -> bool {
        self.energy_used == 0 && self.total_bandwidth_used() == 0
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Block tick detection results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickAnalysis {
    // Recovery ticks (positive energy deltas)
    pub recovery_ticks: u32,
    #[serde(rename = "avg_recovery_interval_sec")]
    pub avg_recovery_interval: f64,
    pub energy_per_tick: f64,
    pub bandwidth_per_tick: f64,
    #[serde(rename = "recovery_ticks_per_hour")]
    pub recovery_ticks_per_hr: f64,
    pub recovery_ticks_per_day: f64,

    // Consumption events (negative energy deltas)
    pub consumption_events: u32,
    pub total_energy_consumed: i64,
    pub total_bandwidth_consumed: i64,
    #[serde(rename = "avg_energy_per_consumption")]
    pub avg_energy_per_consume: f64,
    #[serde(rename = "avg_bandwidth_per_consumption")]
    pub avg_bandwidth_per_consume: f64,

    // Raw per-step data for plotting
    pub tick_timestamps_ms: Vec<i64>,
    pub tick_energy_deltas: Vec<i64>,
    pub tick_bandwidth_deltas: Vec<i64>,
}

/// Recovery model that treats the energy already used as the 24h regeneration target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsedBasedAnalysis {
    pub energy_used_ratio: f64,
    pub bandwidth_used_ratio: f64,
    pub energy_used_at_start: i64,
    pub bandwidth_used_at_start: i64,
    pub estimated_full_recovery_seconds: f64,
    pub estimated_full_recovery_hours: f64,
    pub energy_recovery_matches_used_model: bool,
    #[serde(rename = "measured_recovery_rate_per_sec")]
    pub measured_recovery_rate: f64,
    #[serde(rename = "used_based_recovery_rate_per_sec")]
    pub used_based_recovery_rate: f64,
}

/// Which theoretical regeneration model fits the measured rate better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitModel {
    /// `energy_limit / 86400`
    LimitBased,
    /// `energy_used / 86400`
    UsedBased,
}

impl std::fmt::Display for FitModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitModel::LimitBased => write!(f, "limit_based"),
            FitModel::UsedBased => write!(f, "used_based"),
        }
    }
}

/// Comparison of the limit-based and used-based models
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulaValidation {
    pub theoretical_model: String,
    pub measured_model: String,
    /// Absent when the measured rate or either model rate is not positive
    pub best_fit: Option<FitModel>,
    pub confidence: f64,
}

/// Transaction capacity estimates at the two reference costs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PracticalEstimates {
    pub tx_per_day_65k_with_buffer: f64,
    pub tx_per_day_65k_sustained: f64,
    pub tx_per_day_131k_with_buffer: f64,
    pub tx_per_day_131k_sustained: f64,
    #[serde(rename = "energy_needed_for_800_tx_65k")]
    pub energy_needed_800_tx_65k: i64,
    #[serde(rename = "energy_needed_for_800_tx_131k")]
    pub energy_needed_800_tx_131k: i64,
    pub immediate_capacity_65k: i64,
    pub immediate_capacity_131k: i64,
}

/// Aggregate statistics over a finished snapshot series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    // Timing
    #[serde(rename = "actual_duration_seconds")]
    pub actual_duration_sec: f64,

    // Energy
    pub energy_start: i64,
    pub energy_end: i64,
    pub energy_total_delta: i64,
    pub energy_regenerated: i64,
    pub energy_consumed: i64,
    #[serde(rename = "energy_regen_rate_per_second")]
    pub energy_regen_rate_per_sec: f64,
    pub energy_regen_rate_per_day: f64,
    #[serde(rename = "energy_consume_rate_per_second")]
    pub energy_consume_rate_per_sec: f64,
    pub energy_consume_rate_per_day: f64,
    #[serde(rename = "energy_net_rate_per_second")]
    pub energy_net_rate_per_sec: f64,
    pub energy_net_rate_per_day: f64,

    // Bandwidth
    pub bandwidth_start: i64,
    pub bandwidth_end: i64,
    pub bandwidth_total_delta: i64,
    pub bandwidth_regenerated: i64,
    pub bandwidth_consumed: i64,
    #[serde(rename = "bandwidth_regen_rate_per_second")]
    pub bandwidth_regen_rate_per_sec: f64,
    pub bandwidth_regen_rate_per_day: f64,
    #[serde(rename = "bandwidth_consume_rate_per_second")]
    pub bandwidth_consume_rate_per_sec: f64,
    pub bandwidth_consume_rate_per_day: f64,
    #[serde(rename = "bandwidth_net_rate_per_second")]
    pub bandwidth_net_rate_per_sec: f64,
    pub bandwidth_net_rate_per_day: f64,

    // Theoretical rates
    pub theoretical_energy_rate_per_day: f64,
    pub theoretical_bandwidth_rate_per_day: f64,
    pub energy_rate_matches_theory: bool,
    pub bandwidth_rate_matches_theory: bool,

    // Baseline transaction throughput from the regen rate
    #[serde(rename = "tx_per_day_65k_energy")]
    pub tx_per_day_65k: f64,
    #[serde(rename = "tx_per_day_131k_energy")]
    pub tx_per_day_131k: f64,

    pub tick_analysis: TickAnalysis,
    pub used_based_analysis: UsedBasedAnalysis,
    pub formula_validation: FormulaValidation,
    pub practical_estimates: PracticalEstimates,
}

// ============================================================================
// Simulation
// ============================================================================

/// Result of projecting transaction capacity over the next 24 hours
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub target_tx: u32,
    #[serde(rename = "tx_cost_energy")]
    pub tx_cost: i64,
    #[serde(rename = "current_available_energy")]
    pub current_available: i64,
    pub immediate_capacity: i64,
    #[serde(rename = "recovery_rate_per_sec")]
    pub recovery_rate_per_sec: f64,
    pub seconds_per_tx: f64,
    pub total_24h_capacity: i64,
    pub can_reach_target: bool,
    #[serde(rename = "required_energy_limit_for_target")]
    pub required_energy_limit: i64,
    /// Transactions affordable in each of the next 24 hours
    pub hourly_projection: Vec<i64>,
}

// ============================================================================
// Report
// ============================================================================

/// Information about the monitoring session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub address: String,
    pub node: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: u64,
    pub samples_count: usize,
    pub interval_ms: u64,
}

/// Complete exported session: metadata, raw series and analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorReport {
    pub metadata: Metadata,
    pub snapshots: Vec<ResourceSnapshot>,
    pub analysis: Analysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(energy_used: i64, net_used: i64, free_net_used: i64) -> RawReading {
        RawReading {
            energy_limit: 1_000_000,
            energy_used,
            net_limit: 5_000,
            net_used,
            free_net_limit: 600,
            free_net_used,
        }
    }

    #[test]
    fn test_snapshot_computes_availability() {
        let snap = ResourceSnapshot::from_reading(reading(400_000, 1_000, 100), Utc::now(), 0, None);
        assert_eq!(snap.energy_available, 600_000);
        assert_eq!(snap.bandwidth_available, 5_600 - 1_100);
        assert_eq!(snap.total_bandwidth_limit(), 5_600);
        assert_eq!(snap.total_bandwidth_used(), 1_100);
    }

    #[test]
    fn test_first_snapshot_has_zero_deltas() {
        let snap = ResourceSnapshot::from_reading(reading(1, 2, 3), Utc::now(), 0, None);
        assert_eq!(snap.delta_energy, 0);
        assert_eq!(snap.delta_bandwidth, 0);
    }

    #[test]
    fn test_snapshot_deltas_against_previous() {
        let first = ResourceSnapshot::from_reading(reading(500_000, 1_000, 0), Utc::now(), 0, None);
        let second =
            ResourceSnapshot::from_reading(reading(499_000, 1_200, 0), Utc::now(), 1_000, Some(&first));
        assert_eq!(second.delta_energy, 1_000);
        assert_eq!(second.delta_bandwidth, -200);
    }

    #[test]
    fn test_is_fully_recovered_checks_used_counters() {
        let used = ResourceSnapshot::from_reading(reading(0, 0, 10), Utc::now(), 0, None);
        assert!(!used.is_fully_recovered());

        let clean = ResourceSnapshot::from_reading(reading(0, 0, 0), Utc::now(), 0, None);
        assert!(clean.is_fully_recovered());

        // No stake at all also counts
        let empty = ResourceSnapshot::from_reading(RawReading::default(), Utc::now(), 0, None);
        assert!(empty.is_fully_recovered());
    }

    #[test]
    fn test_analysis_json_field_names() {
        let json = serde_json::to_value(Analysis::default()).unwrap();
        assert!(json.get("energy_regen_rate_per_second").is_some());
        assert!(json.get("actual_duration_seconds").is_some());
        assert!(json["tick_analysis"].get("recovery_ticks").is_some());
        assert!(json["formula_validation"]["best_fit"].is_null());
        assert!(json["practical_estimates"].get("immediate_capacity_65k").is_some());
        assert!(json["practical_estimates"]
            .get("energy_needed_for_800_tx_65k")
            .is_some());
    }

    #[test]
    fn test_fit_model_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FitModel::UsedBased).unwrap(),
            "\"used_based\""
        );
        assert_eq!(FitModel::LimitBased.to_string(), "limit_based");
    }
}
