//! Services module
//!
//! The engine proper: fetching readings, sampling them into a series,
//! analysing the series and projecting capacity.

pub mod analysis;
pub mod capacity;
pub mod fetcher;
pub mod report;
pub mod sampler;

pub use analysis::analyze;
pub use capacity::simulate;
pub use fetcher::{validate_address, FetchError, ResourceFetcher, TronFetcher};
pub use report::{build_report, compare_analyses, load_report, save_report, ComparisonRow};
pub use sampler::{
    shutdown_channel, SampleEvent, Sampler, SamplerConfig, SamplingOutcome, ShutdownSignal,
    ShutdownTrigger, SnapshotSink, StopPolicy, Termination,
};
