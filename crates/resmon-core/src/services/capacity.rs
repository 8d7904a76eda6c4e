//! Transaction capacity projection
//!
//! Turns available energy and the measured regeneration rate into how many
//! transactions an account can send now, per day, and hour by hour.

use crate::error::{Error, Result};
use crate::models::{Analysis, PracticalEstimates, ResourceSnapshot, SimulationResult};
use crate::services::analysis::rates::{TX_COST_131K, TX_COST_65K};

/// Daily transaction count the reference energy figures are sized for
pub const REFERENCE_DAILY_TX: i64 = 800;

/// Hours covered by the simulation
pub const PROJECTION_HOURS: usize = 24;

/// Capacity at the two reference costs, from the first snapshot's availability
pub fn estimate_capacity(first: &ResourceSnapshot, analysis: &Analysis) -> PracticalEstimates {
    let mut est = PracticalEstimates {
        energy_needed_800_tx_65k: REFERENCE_DAILY_TX * TX_COST_65K,
        energy_needed_800_tx_131k: REFERENCE_DAILY_TX * TX_COST_131K,
        ..PracticalEstimates::default()
    };

    if first.energy_available > 0 {
        est.immediate_capacity_65k = first.energy_available / TX_COST_65K;
        est.immediate_capacity_131k = first.energy_available / TX_COST_131K;
    }

    let regen_per_day = analysis.energy_regen_rate_per_day;
    if regen_per_day > 0.0 {
        est.tx_per_day_65k_sustained = regen_per_day / TX_COST_65K as f64;
        est.tx_per_day_131k_sustained = regen_per_day / TX_COST_131K as f64;

        let buffered = first.energy_available as f64 + regen_per_day;
        est.tx_per_day_65k_with_buffer = buffered / TX_COST_65K as f64;
        est.tx_per_day_131k_with_buffer = buffered / TX_COST_131K as f64;
    }

    est
}

/// Project transaction capacity over the next 24 hours
///
/// Each hour spends as many whole transactions as the running balance
/// allows, then regains 1/24 of the daily regen rate, capped at the
/// snapshot's energy limit. When the target is out of reach the required
/// limit assumes the whole limit regenerates once per day. Totals saturate
/// at `i64::MAX` instead of overflowing for extreme costs and targets.
///
/// # Errors
///
/// Returns a validation error when `tx_cost` is not positive.
pub fn simulate(
    snapshot: &ResourceSnapshot,
    analysis: &Analysis,
    tx_cost: i64,
    target_tx: u32,
) -> Result<SimulationResult> {
    if tx_cost <= 0 {
        return Err(Error::validation("transaction cost must be positive"));
    }

    let mut sim = SimulationResult {
        target_tx,
        tx_cost,
        current_available: snapshot.energy_available,
        recovery_rate_per_sec: analysis.energy_regen_rate_per_sec,
        immediate_capacity: snapshot.energy_available / tx_cost,
        hourly_projection: Vec::with_capacity(PROJECTION_HOURS),
        ..SimulationResult::default()
    };

    if analysis.energy_regen_rate_per_sec > 0.0 {
        sim.seconds_per_tx = tx_cost as f64 / analysis.energy_regen_rate_per_sec;
    }

    let recovered_per_day = analysis.energy_regen_rate_per_day as i64;
    sim.total_24h_capacity = sim
        .immediate_capacity
        .saturating_add(recovered_per_day / tx_cost);

    let energy_per_hour = (analysis.energy_regen_rate_per_day / PROJECTION_HOURS as f64) as i64;
    let mut current = snapshot.energy_available;
    for _ in 0..PROJECTION_HOURS {
        let tx_this_hour = current / tx_cost;
        sim.hourly_projection.push(tx_this_hour);

        current = (current - tx_this_hour * tx_cost)
            .saturating_add(energy_per_hour)
            .min(snapshot.energy_limit);
    }

    sim.can_reach_target = sim.total_24h_capacity >= i64::from(target_tx);
    if !sim.can_reach_target {
        sim.required_energy_limit = i64::from(target_tx).saturating_mul(tx_cost);
    }

    log::debug!(
        "[capacity] {} tx/24h at {} energy each (target {})",
        sim.total_24h_capacity,
        tx_cost,
        target_tx
    );

    Ok(sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawReading;
    use chrono::Utc;

    fn snapshot(limit: i64, used: i64) -> ResourceSnapshot {
        let reading = RawReading {
            energy_limit: limit,
            energy_used: used,
            ..RawReading::default()
        };
        ResourceSnapshot::from_reading(reading, Utc::now(), 0, None)
    }

    fn regen(per_day: f64) -> Analysis {
        Analysis {
            energy_regen_rate_per_sec: per_day / 86_400.0,
            energy_regen_rate_per_day: per_day,
            ..Analysis::default()
        }
    }

    // =========================================================================
    // Estimate Tests
    // =========================================================================

    #[test]
    fn test_estimates_with_regen() {
        let est = estimate_capacity(&snapshot(2_000_000, 700_000), &regen(1_300_000.0));

        assert_eq!(est.immediate_capacity_65k, 20);
        assert_eq!(est.immediate_capacity_131k, 9);
        assert_eq!(est.tx_per_day_65k_sustained, 20.0);
        assert_eq!(est.tx_per_day_65k_with_buffer, 40.0);
        assert_eq!(est.energy_needed_800_tx_65k, 52_000_000);
        assert_eq!(est.energy_needed_800_tx_131k, 104_800_000);
    }

    #[test]
    fn test_estimates_without_regen() {
        let est = estimate_capacity(&snapshot(1_000_000, 0), &Analysis::default());
        assert_eq!(est.immediate_capacity_65k, 15);
        assert_eq!(est.tx_per_day_65k_sustained, 0.0);
        assert_eq!(est.tx_per_day_65k_with_buffer, 0.0);
    }

    #[test]
    fn test_estimates_no_available_energy() {
        let est = estimate_capacity(&snapshot(0, 0), &regen(65_000.0));
        assert_eq!(est.immediate_capacity_65k, 0);
        assert_eq!(est.tx_per_day_65k_sustained, 1.0);
        assert_eq!(est.tx_per_day_65k_with_buffer, 1.0);
    }

    // =========================================================================
    // Simulation Tests
    // =========================================================================

    #[test]
    fn test_simulation_without_regen_depletes() {
        let sim = simulate(&snapshot(650_000, 0), &Analysis::default(), 65_000, 800).unwrap();

        assert_eq!(sim.immediate_capacity, 10);
        assert_eq!(sim.seconds_per_tx, 0.0);
        assert_eq!(sim.hourly_projection.len(), 24);
        assert_eq!(sim.hourly_projection[0], 10);
        assert!(sim.hourly_projection[1..].iter().all(|&tx| tx == 0));
        assert_eq!(sim.total_24h_capacity, 10);
        assert!(!sim.can_reach_target);
        assert_eq!(sim.required_energy_limit, 800 * 65_000);
    }

    #[test]
    fn test_simulation_with_regen() {
        // 65k per hour regenerated
        let sim = simulate(&snapshot(1_000_000, 870_000), &regen(1_560_000.0), 65_000, 20).unwrap();

        assert_eq!(sim.current_available, 130_000);
        assert_eq!(sim.immediate_capacity, 2);
        assert_eq!(sim.hourly_projection[0], 2);
        assert!(sim.hourly_projection[1..].iter().all(|&tx| tx == 1));
        assert_eq!(sim.total_24h_capacity, 2 + 24);
        assert!(sim.can_reach_target);
        assert_eq!(sim.required_energy_limit, 0);
        assert!((sim.seconds_per_tx - 3_600.0).abs() < 1e-6);
    }

    #[test]
    fn test_simulation_never_exceeds_limit() {
        let limit = 200_000;
        let snap = snapshot(limit, 100_000);
        // Regen far above the cap; each hour's spend is bounded by the limit
        let sim = simulate(&snap, &regen(100_000_000.0), 150_000, 1).unwrap();

        let max_per_hour = limit / 150_000;
        assert!(sim.hourly_projection.iter().all(|&tx| tx <= max_per_hour));
        assert_eq!(sim.hourly_projection[0], 0);
        assert_eq!(sim.hourly_projection[1], 1);
    }

    #[test]
    fn test_simulation_refills_exactly_to_limit() {
        // Limit is exactly four transactions and regen refills it every hour
        let tx_cost = 65_000;
        let limit = 4 * tx_cost;
        let sim = simulate(&snapshot(limit, 0), &regen(100_000_000.0), tx_cost, 1_000).unwrap();

        assert_eq!(sim.immediate_capacity, 4);
        assert_eq!(sim.hourly_projection.len(), PROJECTION_HOURS);
        for (hour, &tx) in sim.hourly_projection.iter().enumerate() {
            assert_eq!(tx, 4, "hour {}", hour);
        }
    }

    #[test]
    fn test_simulation_saturates_huge_cost_and_target() {
        let sim = simulate(
            &snapshot(1_000_000, 0),
            &Analysis::default(),
            4_000_000_000,
            4_000_000_000,
        )
        .unwrap();

        assert_eq!(sim.immediate_capacity, 0);
        assert!(!sim.can_reach_target);
        assert_eq!(sim.required_energy_limit, i64::MAX);
    }

    #[test]
    fn test_simulation_saturates_huge_regen() {
        let sim = simulate(&snapshot(i64::MAX, 0), &regen(f64::MAX), 1, 1).unwrap();

        assert_eq!(sim.total_24h_capacity, i64::MAX);
        assert!(sim.can_reach_target);
        assert_eq!(sim.hourly_projection[1], i64::MAX);
    }

    #[test]
    fn test_simulation_rejects_non_positive_cost() {
        let err = simulate(&snapshot(1, 0), &Analysis::default(), 0, 1).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
