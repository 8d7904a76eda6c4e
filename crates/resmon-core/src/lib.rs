//! # resmon-core
//!
//! Core sampling and analysis engine for TRON account resources.
//!
//! This crate provides:
//! - Data models for readings, snapshots and analysis results (`models` module)
//! - Monitor configuration and defaults (`config` module)
//! - The resource fetcher trait and TRON HTTP fetcher (`services::fetcher`)
//! - The cancellable sampling loop (`services::sampler`)
//! - Tick/rate analysis and capacity projection (`services::analysis`, `services::capacity`)
//! - Report export, import and comparison (`services::report`)
//! - Unified error handling (`error` module)

pub mod config;
pub mod error;
pub mod models;
pub mod services;

// Re-exports for convenience
pub use config::MonitorConfig;
pub use error::{Error, Result};

// Re-export commonly used types from models
pub use models::{
    Analysis, FitModel, FormulaValidation, Metadata, MonitorReport, PracticalEstimates,
    RawReading, ResourceSnapshot, SimulationResult, TickAnalysis, UsedBasedAnalysis,
};

// Re-export commonly used types from services
pub use services::{
    analyze, build_report, compare_analyses, load_report, save_report, shutdown_channel,
    simulate, validate_address, ComparisonRow, FetchError, ResourceFetcher, SampleEvent, Sampler,
    SamplerConfig, SamplingOutcome, ShutdownSignal, ShutdownTrigger, SnapshotSink, StopPolicy,
    Termination, TronFetcher,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}
