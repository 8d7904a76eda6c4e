//! Regeneration and consumption rates
//!
//! Rates are measured from positive and negative deltas separately, then
//! compared against two theoretical 24h recovery models:
//! - **limit-based**: the whole limit regenerates once per day
//! - **used-based**: what was already used at the start regenerates within a day

use crate::models::{Analysis, FitModel, FormulaValidation, ResourceSnapshot, UsedBasedAnalysis};

/// Seconds in one regeneration cycle
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Relative tolerance for the limit-based model
pub const LIMIT_MODEL_TOLERANCE: f64 = 0.10;

/// Relative tolerance for the used-based model
pub const USED_MODEL_TOLERANCE: f64 = 0.15;

/// Reference transaction costs, in energy
pub const TX_COST_65K: i64 = 65_000;
pub const TX_COST_131K: i64 = 131_000;

const LIMIT_MODEL_LABEL: &str = "E_limit / 86400";
const USED_MODEL_LABEL: &str = "E_used / T_recovery";

/// Sum of positive deltas and sum of negated negative deltas
///
/// The first snapshot carries no delta and is skipped.
fn split_deltas(snapshots: &[ResourceSnapshot], delta: impl Fn(&ResourceSnapshot) -> i64) -> (i64, i64) {
    snapshots
        .iter()
        .skip(1)
        .map(delta)
        .fold((0, 0), |(regen, consumed), d| {
            if d > 0 {
                (regen + d, consumed)
            } else {
                (regen, consumed - d)
            }
        })
}

/// `true` when `measured` is within `tolerance` of `theoretical`, both positive
fn within_tolerance(measured: f64, theoretical: f64, tolerance: f64) -> bool {
    if measured <= 0.0 || theoretical <= 0.0 {
        return false;
    }
    (measured / theoretical - 1.0).abs() < tolerance
}

/// Fill in totals, rates, theory comparison and baseline throughput
///
/// Returns the zero-valued analysis for an empty series. Sub-analyses
/// (ticks, used-based, formula, estimates) are left at their defaults.
pub fn analyze_rates(snapshots: &[ResourceSnapshot]) -> Analysis {
    let (first, last) = match (snapshots.first(), snapshots.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Analysis::default(),
    };

    let actual_duration_sec = (last.elapsed_ms - first.elapsed_ms) as f64 / 1000.0;

    let (energy_regenerated, energy_consumed) = split_deltas(snapshots, |s| s.delta_energy);
    let (bandwidth_regenerated, bandwidth_consumed) = split_deltas(snapshots, |s| s.delta_bandwidth);

    let mut analysis = Analysis {
        actual_duration_sec,

        energy_start: first.energy_available,
        energy_end: last.energy_available,
        energy_total_delta: last.energy_available - first.energy_available,
        energy_regenerated,
        energy_consumed,

        bandwidth_start: first.bandwidth_available,
        bandwidth_end: last.bandwidth_available,
        bandwidth_total_delta: last.bandwidth_available - first.bandwidth_available,
        bandwidth_regenerated,
        bandwidth_consumed,

        ..Analysis::default()
    };

    if actual_duration_sec > 0.0 {
        analysis.energy_regen_rate_per_sec = energy_regenerated as f64 / actual_duration_sec;
        analysis.energy_regen_rate_per_day = analysis.energy_regen_rate_per_sec * SECONDS_PER_DAY;
        analysis.bandwidth_regen_rate_per_sec = bandwidth_regenerated as f64 / actual_duration_sec;
        analysis.bandwidth_regen_rate_per_day =
            analysis.bandwidth_regen_rate_per_sec * SECONDS_PER_DAY;

        analysis.energy_consume_rate_per_sec = energy_consumed as f64 / actual_duration_sec;
        analysis.energy_consume_rate_per_day =
            analysis.energy_consume_rate_per_sec * SECONDS_PER_DAY;
        analysis.bandwidth_consume_rate_per_sec = bandwidth_consumed as f64 / actual_duration_sec;
        analysis.bandwidth_consume_rate_per_day =
            analysis.bandwidth_consume_rate_per_sec * SECONDS_PER_DAY;

        // Negative for an account spending faster than it regenerates
        analysis.energy_net_rate_per_sec =
            analysis.energy_regen_rate_per_sec - analysis.energy_consume_rate_per_sec;
        analysis.energy_net_rate_per_day = analysis.energy_net_rate_per_sec * SECONDS_PER_DAY;
        analysis.bandwidth_net_rate_per_sec =
            analysis.bandwidth_regen_rate_per_sec - analysis.bandwidth_consume_rate_per_sec;
        analysis.bandwidth_net_rate_per_day =
            analysis.bandwidth_net_rate_per_sec * SECONDS_PER_DAY;
    }

    analysis.theoretical_energy_rate_per_day = first.energy_limit as f64;
    analysis.theoretical_bandwidth_rate_per_day = first.total_bandwidth_limit() as f64;

    // Regen rate, not net, is what the model predicts
    analysis.energy_rate_matches_theory = within_tolerance(
        analysis.energy_regen_rate_per_day,
        analysis.theoretical_energy_rate_per_day,
        LIMIT_MODEL_TOLERANCE,
    );
    analysis.bandwidth_rate_matches_theory = within_tolerance(
        analysis.bandwidth_regen_rate_per_day,
        analysis.theoretical_bandwidth_rate_per_day,
        LIMIT_MODEL_TOLERANCE,
    );

    if analysis.energy_regen_rate_per_day > 0.0 {
        analysis.tx_per_day_65k = analysis.energy_regen_rate_per_day / TX_COST_65K as f64;
        analysis.tx_per_day_131k = analysis.energy_regen_rate_per_day / TX_COST_131K as f64;
    }

    analysis
}

/// Used-based recovery model for the first snapshot
pub fn analyze_used_based(snapshots: &[ResourceSnapshot], measured_rate: f64) -> UsedBasedAnalysis {
    let first = match snapshots.first() {
        Some(first) => first,
        None => return UsedBasedAnalysis::default(),
    };

    let mut used = UsedBasedAnalysis {
        energy_used_at_start: first.energy_used,
        bandwidth_used_at_start: first.total_bandwidth_used(),
        measured_recovery_rate: measured_rate,
        ..UsedBasedAnalysis::default()
    };

    if first.energy_limit > 0 {
        used.energy_used_ratio = first.energy_used as f64 / first.energy_limit as f64;
    }
    if first.total_bandwidth_limit() > 0 {
        used.bandwidth_used_ratio =
            first.total_bandwidth_used() as f64 / first.total_bandwidth_limit() as f64;
    }

    if first.energy_used > 0 {
        used.used_based_recovery_rate = first.energy_used as f64 / SECONDS_PER_DAY;

        if measured_rate > 0.0 {
            used.estimated_full_recovery_seconds = first.energy_used as f64 / measured_rate;
            used.estimated_full_recovery_hours = used.estimated_full_recovery_seconds / 3600.0;
        }

        used.energy_recovery_matches_used_model = within_tolerance(
            measured_rate,
            used.used_based_recovery_rate,
            USED_MODEL_TOLERANCE,
        );
    }

    used
}

/// Pick whichever theoretical model is closer to the measured regen rate
///
/// Ties go to the limit-based model. Confidence is `1 - relative_error`,
/// floored at zero.
pub fn validate_formulas(analysis: &Analysis, first: &ResourceSnapshot) -> FormulaValidation {
    let mut validation = FormulaValidation {
        theoretical_model: LIMIT_MODEL_LABEL.to_string(),
        measured_model: USED_MODEL_LABEL.to_string(),
        ..FormulaValidation::default()
    };

    let from_limit = first.energy_limit as f64 / SECONDS_PER_DAY;
    let from_used = first.energy_used as f64 / SECONDS_PER_DAY;
    let measured = analysis.energy_regen_rate_per_sec;

    if measured > 0.0 && from_limit > 0.0 && from_used > 0.0 {
        let diff_limit = (measured - from_limit).abs() / from_limit;
        let diff_used = (measured - from_used).abs() / from_used;

        let (model, error) = if diff_used < diff_limit {
            (FitModel::UsedBased, diff_used)
        } else {
            (FitModel::LimitBased, diff_limit)
        };

        validation.best_fit = Some(model);
        validation.confidence = (1.0 - error).max(0.0);
    }

    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawReading;
    use chrono::Utc;

    fn series(limit: i64, points: &[(i64, i64)]) -> Vec<ResourceSnapshot> {
        let mut out: Vec<ResourceSnapshot> = Vec::new();
        for &(elapsed_ms, energy_used) in points {
            let reading = RawReading {
                energy_limit: limit,
                energy_used,
                net_limit: 5_000,
                net_used: 1_000,
                free_net_limit: 600,
                free_net_used: 0,
            };
            let snap = ResourceSnapshot::from_reading(reading, Utc::now(), elapsed_ms, out.last());
            out.push(snap);
        }
        out
    }

    // =========================================================================
    // Rate Tests
    // =========================================================================

    #[test]
    fn test_empty_series_is_zero() {
        assert_eq!(analyze_rates(&[]), Analysis::default());
    }

    #[test]
    fn test_regen_and_consume_rates() {
        // Deltas: +1000, -500, 0 over two seconds of measured span
        let snaps = series(
            1_000_000,
            &[(0, 500_000), (1_000, 499_000), (2_000, 499_500), (2_000, 499_500)],
        );
        let a = analyze_rates(&snaps);

        assert_eq!(a.actual_duration_sec, 2.0);
        assert_eq!(a.energy_regenerated, 1_000);
        assert_eq!(a.energy_consumed, 500);
        assert_eq!(a.energy_regen_rate_per_sec, 500.0);
        assert_eq!(a.energy_consume_rate_per_sec, 250.0);
        assert_eq!(a.energy_net_rate_per_sec, 250.0);
        assert_eq!(a.energy_regen_rate_per_day, 500.0 * 86_400.0);
        assert_eq!(a.energy_net_rate_per_day, 250.0 * 86_400.0);
    }

    #[test]
    fn test_regenerated_minus_consumed_is_total_delta() {
        let snaps = series(
            2_000_000,
            &[
                (0, 900_000),
                (3_000, 880_000),
                (6_000, 950_000),
                (9_000, 949_000),
                (12_000, 700_000),
                (15_000, 700_000),
            ],
        );
        let a = analyze_rates(&snaps);

        let signed_sum: i64 = snaps.iter().skip(1).map(|s| s.delta_energy).sum();
        assert_eq!(signed_sum, a.energy_total_delta);
        assert_eq!(a.energy_regenerated - a.energy_consumed, a.energy_total_delta);
        assert_eq!(
            a.bandwidth_regenerated - a.bandwidth_consumed,
            a.bandwidth_total_delta
        );
    }

    #[test]
    fn test_net_rate_may_be_negative() {
        let snaps = series(1_000_000, &[(0, 100_000), (10_000, 300_000)]);
        let a = analyze_rates(&snaps);
        assert_eq!(a.energy_net_rate_per_sec, -20_000.0);
        assert_eq!(a.tx_per_day_65k, 0.0);
    }

    #[test]
    fn test_zero_duration_leaves_rates_at_zero() {
        let snaps = series(1_000_000, &[(5_000, 100_000), (5_000, 90_000)]);
        let a = analyze_rates(&snaps);
        assert_eq!(a.actual_duration_sec, 0.0);
        assert_eq!(a.energy_regenerated, 10_000);
        assert_eq!(a.energy_regen_rate_per_sec, 0.0);
        assert_eq!(a.energy_regen_rate_per_day, 0.0);
        assert!(!a.energy_rate_matches_theory);
    }

    // =========================================================================
    // Theory Tests
    // =========================================================================

    #[test]
    fn test_matches_theory_within_ten_percent() {
        // Limit 86_400 -> theoretical 1/sec; regenerate 105 over 100s
        let snaps = series(86_400, &[(0, 50_000), (100_000, 49_895)]);
        let a = analyze_rates(&snaps);
        assert_eq!(a.theoretical_energy_rate_per_day, 86_400.0);
        assert!(a.energy_rate_matches_theory);

        // 115 over 100s is 15% off
        let snaps = series(86_400, &[(0, 50_000), (100_000, 49_885)]);
        assert!(!analyze_rates(&snaps).energy_rate_matches_theory);
    }

    #[test]
    fn test_theory_undefined_without_limit() {
        let snaps = series(0, &[(0, 0), (1_000, -100)]);
        let a = analyze_rates(&snaps);
        assert!(a.energy_regen_rate_per_sec > 0.0);
        assert!(!a.energy_rate_matches_theory);
    }

    #[test]
    fn test_bandwidth_theory_uses_total_limit() {
        let snaps = series(1_000_000, &[(0, 0), (1_000, 0)]);
        let a = analyze_rates(&snaps);
        assert_eq!(a.theoretical_bandwidth_rate_per_day, 5_600.0);
    }

    #[test]
    fn test_baseline_tx_estimates() {
        // 1.3M per day regen
        let snaps = series(10_000_000, &[(0, 1_000_000), (86_400_000, -300_000)]);
        let a = analyze_rates(&snaps);
        assert!((a.energy_regen_rate_per_day - 1_300_000.0).abs() < 1e-6);
        assert!((a.tx_per_day_65k - 20.0).abs() < 1e-9);
        assert!((a.tx_per_day_131k - 1_300_000.0 / 131_000.0).abs() < 1e-9);
    }

    // =========================================================================
    // Used-Based Model Tests
    // =========================================================================

    #[test]
    fn test_used_based_model() {
        let snaps = series(1_000_000, &[(0, 432_000)]);
        // 432_000 / 86_400 = 5/sec
        let used = analyze_used_based(&snaps, 5.2);

        assert_eq!(used.energy_used_at_start, 432_000);
        assert_eq!(used.energy_used_ratio, 0.432);
        assert_eq!(used.bandwidth_used_at_start, 1_000);
        assert_eq!(used.used_based_recovery_rate, 5.0);
        assert!(used.energy_recovery_matches_used_model);
        assert!((used.estimated_full_recovery_seconds - 432_000.0 / 5.2).abs() < 1e-6);
        assert!((used.estimated_full_recovery_hours - 432_000.0 / 5.2 / 3600.0).abs() < 1e-6);

        let off = analyze_used_based(&snaps, 6.0);
        assert!(!off.energy_recovery_matches_used_model);
    }

    #[test]
    fn test_used_based_without_measured_rate() {
        let snaps = series(1_000_000, &[(0, 432_000)]);
        let used = analyze_used_based(&snaps, 0.0);
        assert_eq!(used.estimated_full_recovery_seconds, 0.0);
        assert!(!used.energy_recovery_matches_used_model);
    }

    #[test]
    fn test_used_based_empty() {
        assert_eq!(analyze_used_based(&[], 10.0), UsedBasedAnalysis::default());
    }

    // =========================================================================
    // Formula Validation Tests
    // =========================================================================

    #[test]
    fn test_formula_prefers_used_model() {
        let snaps = series(8_640_000, &[(0, 864_000)]);
        // Limit model: 100/sec, used model: 10/sec
        let analysis = Analysis {
            energy_regen_rate_per_sec: 11.0,
            ..Analysis::default()
        };
        let v = validate_formulas(&analysis, &snaps[0]);
        assert_eq!(v.best_fit, Some(FitModel::UsedBased));
        assert!((v.confidence - 0.9).abs() < 1e-9);
        assert_eq!(v.theoretical_model, "E_limit / 86400");
        assert_eq!(v.measured_model, "E_used / T_recovery");
    }

    #[test]
    fn test_formula_prefers_limit_model() {
        let snaps = series(8_640_000, &[(0, 864_000)]);
        let analysis = Analysis {
            energy_regen_rate_per_sec: 95.0,
            ..Analysis::default()
        };
        let v = validate_formulas(&analysis, &snaps[0]);
        assert_eq!(v.best_fit, Some(FitModel::LimitBased));
        assert!((v.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_formula_confidence_floor() {
        let snaps = series(86_400, &[(0, 86_400)]);
        // Both models say 1/sec; measured is far above
        let analysis = Analysis {
            energy_regen_rate_per_sec: 5.0,
            ..Analysis::default()
        };
        let v = validate_formulas(&analysis, &snaps[0]);
        assert_eq!(v.best_fit, Some(FitModel::LimitBased));
        assert_eq!(v.confidence, 0.0);
    }

    #[test]
    fn test_formula_needs_positive_inputs() {
        let snaps = series(1_000_000, &[(0, 0)]);
        let analysis = Analysis {
            energy_regen_rate_per_sec: 5.0,
            ..Analysis::default()
        };
        let v = validate_formulas(&analysis, &snaps[0]);
        assert!(v.best_fit.is_none());
        assert_eq!(v.confidence, 0.0);
    }
}
