//! Monitor configuration
//!
//! Defaults live here as constants; the CLI maps its flags onto
//! [`MonitorConfig`] and calls [`MonitorConfig::validate`] before sampling.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::services::fetcher::validate_address;
use crate::services::sampler::{SamplerConfig, StopPolicy};

// ============================================================================
// Constants
// ============================================================================

/// Default TRON full node
pub const DEFAULT_NODE: &str = "https://api.trongrid.io";

/// Default fixed sampling duration in seconds
pub const DEFAULT_DURATION_SECS: u64 = 20;

/// Default sampling interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Minimum sampling interval in milliseconds
pub const MIN_INTERVAL_MS: u64 = 100;

/// Default cap for until-full sampling, in seconds
pub const DEFAULT_MAX_DURATION_SECS: u64 = 86_400;

/// Default per-transaction energy cost for simulation
pub const DEFAULT_TX_COST: i64 = 65_000;

/// Default daily transaction target for simulation
pub const DEFAULT_TARGET_TX: u32 = 800;

// ============================================================================
// Configuration
// ============================================================================

/// Settings for the optional post-session transaction simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub tx_cost: i64,
    pub target_tx: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tx_cost: DEFAULT_TX_COST,
            target_tx: DEFAULT_TARGET_TX,
        }
    }
}

/// Configuration for one monitoring session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Account address (base58, `T...`)
    pub address: String,
    /// Full node base URL
    pub node: String,
    /// Sampling interval in milliseconds (minimum 100)
    pub interval_ms: u64,
    /// When to stop sampling
    pub policy: StopPolicy,
    /// Simulation to run after the session, if any
    pub simulation: Option<SimulationConfig>,
    /// Previous report to compare against
    pub compare_file: Option<PathBuf>,
    /// Directory the report is written to
    pub output_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            node: DEFAULT_NODE.to_string(),
            interval_ms: DEFAULT_INTERVAL_MS,
            policy: StopPolicy::Fixed {
                duration_secs: DEFAULT_DURATION_SECS,
            },
            simulation: None,
            compare_file: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl MonitorConfig {
    /// Create a configuration for the given address with all defaults
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Check the configuration, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.address.is_empty() {
            return Err(Error::validation("address is required"));
        }
        validate_address(&self.address)?;

        if self.node.trim().is_empty() {
            return Err(Error::config("node URL must not be empty"));
        }

        if self.interval_ms < MIN_INTERVAL_MS {
            return Err(Error::validation(format!(
                "interval must be at least {}ms",
                MIN_INTERVAL_MS
            )));
        }

        match self.policy {
            StopPolicy::Fixed { duration_secs } if duration_secs == 0 => {
                return Err(Error::validation("duration must be positive"));
            }
            StopPolicy::UntilFull { max_duration_secs } if max_duration_secs == 0 => {
                return Err(Error::validation("max duration must be positive"));
            }
            _ => {}
        }

        if let Some(sim) = &self.simulation {
            if sim.tx_cost <= 0 {
                return Err(Error::validation("transaction cost must be positive"));
            }
            if sim.target_tx == 0 {
                return Err(Error::validation("target transactions must be positive"));
            }
        }

        Ok(())
    }

    /// Sampler settings derived from this configuration
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            interval: Duration::from_millis(self.interval_ms),
            policy: self.policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "TLyqzVGLV1srkB7dToTAEqgDSfPtXRJZYH";

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.node, DEFAULT_NODE);
        assert_eq!(config.interval_ms, DEFAULT_INTERVAL_MS);
        assert_eq!(
            config.policy,
            StopPolicy::Fixed {
                duration_secs: DEFAULT_DURATION_SECS
            }
        );
        assert!(config.simulation.is_none());
    }

    #[test]
    fn test_validate_ok() {
        assert!(MonitorConfig::for_address(ADDRESS).validate().is_ok());
    }

    #[test]
    fn test_validate_requires_address() {
        let err = MonitorConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_bad_address() {
        let err = MonitorConfig::for_address("Xabc").validate().unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[test]
    fn test_validate_enforces_minimum_interval() {
        let config = MonitorConfig {
            interval_ms: 99,
            ..MonitorConfig::for_address(ADDRESS)
        };
        assert!(config.validate().unwrap_err().to_string().contains("100ms"));

        let config = MonitorConfig {
            interval_ms: 100,
            ..MonitorConfig::for_address(ADDRESS)
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let fixed = MonitorConfig {
            policy: StopPolicy::Fixed { duration_secs: 0 },
            ..MonitorConfig::for_address(ADDRESS)
        };
        assert!(fixed.validate().is_err());

        let until_full = MonitorConfig {
            policy: StopPolicy::UntilFull {
                max_duration_secs: 0,
            },
            ..MonitorConfig::for_address(ADDRESS)
        };
        assert!(until_full.validate().is_err());
    }

    #[test]
    fn test_validate_simulation_settings() {
        let config = MonitorConfig {
            simulation: Some(SimulationConfig {
                tx_cost: 0,
                target_tx: 800,
            }),
            ..MonitorConfig::for_address(ADDRESS)
        };
        assert!(config.validate().is_err());

        let config = MonitorConfig {
            simulation: Some(SimulationConfig::default()),
            ..MonitorConfig::for_address(ADDRESS)
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sampler_config() {
        let config = MonitorConfig {
            interval_ms: 250,
            ..MonitorConfig::for_address(ADDRESS)
        };
        let sampler = config.sampler_config();
        assert_eq!(sampler.interval, Duration::from_millis(250));
        assert_eq!(sampler.policy, config.policy);
    }
}
