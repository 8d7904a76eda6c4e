//! Block tick detection
//!
//! Resources regenerate on the block cadence, so a sampled step where
//! available energy went up is treated as one recovery tick. Bandwidth
//! regeneration is accumulated on the same energy ticks.

use crate::models::{ResourceSnapshot, TickAnalysis};

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Separate recovery ticks from consumption events over a snapshot series
///
/// Fewer than two snapshots yield an all-zero result.
pub fn analyze_block_ticks(snapshots: &[ResourceSnapshot]) -> TickAnalysis {
    let mut tick = TickAnalysis::default();

    if snapshots.len() < 2 {
        return tick;
    }

    let mut regen_energy: i64 = 0;
    let mut regen_bandwidth: i64 = 0;
    let mut recovery_timestamps: Vec<i64> = Vec::new();

    for s in &snapshots[1..] {
        tick.tick_timestamps_ms.push(s.elapsed_ms);
        tick.tick_energy_deltas.push(s.delta_energy);
        tick.tick_bandwidth_deltas.push(s.delta_bandwidth);

        if s.delta_energy > 0 {
            tick.recovery_ticks += 1;
            regen_energy += s.delta_energy;
            // Bandwidth rides on the energy tick, whatever its own sign
            regen_bandwidth += s.delta_bandwidth;
            recovery_timestamps.push(s.elapsed_ms);
        }

        if s.delta_energy < 0 {
            tick.consumption_events += 1;
            tick.total_energy_consumed += -s.delta_energy;
        }
        // Bandwidth consumption is only tracked in aggregate
        if s.delta_bandwidth < 0 {
            tick.total_bandwidth_consumed += -s.delta_bandwidth;
        }
    }

    if tick.recovery_ticks > 0 {
        let ticks = f64::from(tick.recovery_ticks);
        tick.energy_per_tick = regen_energy as f64 / ticks;
        tick.bandwidth_per_tick = regen_bandwidth as f64 / ticks;

        if let (Some(first), Some(last)) = (recovery_timestamps.first(), recovery_timestamps.last())
        {
            if recovery_timestamps.len() > 1 {
                let avg_interval_ms =
                    (last - first) as f64 / (recovery_timestamps.len() - 1) as f64;
                tick.avg_recovery_interval = avg_interval_ms / 1000.0;

                if avg_interval_ms > 0.0 {
                    tick.recovery_ticks_per_hr = MS_PER_HOUR / avg_interval_ms;
                    tick.recovery_ticks_per_day = MS_PER_DAY / avg_interval_ms;
                }
            }
        }
    }

    if tick.consumption_events > 0 {
        let events = f64::from(tick.consumption_events);
        tick.avg_energy_per_consume = tick.total_energy_consumed as f64 / events;
        tick.avg_bandwidth_per_consume = tick.total_bandwidth_consumed as f64 / events;
    }

    tick
}
