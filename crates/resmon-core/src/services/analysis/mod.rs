//! Snapshot series analysis
//!
//! Pure functions over a finished, immutable snapshot series. Degenerate
//! input (no snapshots, zero elapsed time, zero rates) produces zero-valued
//! results, never an error.
//!
//! # Usage
//!
//! ```ignore
//! use resmon_core::services::analysis::analyze;
//!
//! let analysis = analyze(&outcome.snapshots);
//! println!("regen: {:.1}/sec", analysis.energy_regen_rate_per_sec);
//! ```

pub mod rates;
pub mod ticks;

use crate::models::{Analysis, ResourceSnapshot};
use crate::services::capacity::estimate_capacity;

pub use rates::{analyze_rates, analyze_used_based, validate_formulas};
pub use ticks::analyze_block_ticks;

/// Compute the full analysis for a snapshot series
pub fn analyze(snapshots: &[ResourceSnapshot]) -> Analysis {
    let first = match snapshots.first() {
        Some(first) => first,
        None => return Analysis::default(),
    };

    let mut analysis = analyze_rates(snapshots);
    analysis.tick_analysis = analyze_block_ticks(snapshots);
    analysis.used_based_analysis =
        analyze_used_based(snapshots, analysis.energy_regen_rate_per_sec);
    analysis.formula_validation = validate_formulas(&analysis, first);
    analysis.practical_estimates = estimate_capacity(first, &analysis);

    log::debug!(
        "[analysis] {} snapshots over {:.1}s: regen {:.2}/s, consume {:.2}/s, {} ticks",
        snapshots.len(),
        analysis.actual_duration_sec,
        analysis.energy_regen_rate_per_sec,
        analysis.energy_consume_rate_per_sec,
        analysis.tick_analysis.recovery_ticks
    );

    analysis
}
