//! Resource sampling loop
//!
//! Polls a [`ResourceFetcher`] at a fixed interval and turns each reading
//! into a delta-annotated [`ResourceSnapshot`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Sampler                           │
//! │                                                          │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │ StopPolicy   │   │ Loop         │   │ Shutdown     │  │
//! │  │ - fixed      │   │ - fetch()    │   │ - checked    │  │
//! │  │ - until full │   │ - sleep()    │   │   at fetch   │  │
//! │  └──────────────┘   └──────────────┘   │   and wait   │  │
//! │                                        └──────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//!           │                   │
//!           ▼                   ▼
//!    ┌──────────────┐    ┌──────────────┐
//!    │   Fetcher    │    │ SnapshotSink │
//!    └──────────────┘    └──────────────┘
//! ```
//!
//! # Behaviour
//!
//! - One fetch per iteration. A failed fetch is a missed sample: nothing is
//!   appended and the delta baseline stays on the last recorded snapshot.
//! - The sink hears about every attempt, recorded or missed, in order.
//! - Between iterations the loop sleeps out whatever is left of the interval.
//! - Shutdown is checked before each fetch, raced against the fetch, and
//!   raced against the wait. It always wins a tie, and whatever was already
//!   recorded is returned intact.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;

use super::fetcher::ResourceFetcher;
use crate::error::{Error, Result};
use crate::models::ResourceSnapshot;

// ============================================================================
// Stop Policy
// ============================================================================

/// When a sampling session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StopPolicy {
    /// Sample for a fixed number of seconds
    Fixed { duration_secs: u64 },
    /// Sample until both `used` counters reach zero, or the cap runs out
    UntilFull { max_duration_secs: u64 },
}

impl StopPolicy {
    /// Number of fetch attempts the session may make
    ///
    /// Fixed: `floor(duration_ms / interval_ms) + 1`.
    /// Until-full: `max_duration_secs + 1`, whatever the interval.
    pub fn max_iterations(&self, interval: Duration) -> u64 {
        match *self {
            StopPolicy::Fixed { duration_secs } => {
                let interval_ms = (interval.as_millis() as u64).max(1);
                duration_secs.saturating_mul(1000) / interval_ms + 1
            }
            StopPolicy::UntilFull { max_duration_secs } => max_duration_secs.saturating_add(1),
        }
    }

    /// Whether a freshly recorded snapshot ends the session early
    pub fn should_stop(&self, snapshot: &ResourceSnapshot) -> bool {
        match self {
            StopPolicy::Fixed { .. } => false,
            StopPolicy::UntilFull { .. } => snapshot.is_fully_recovered(),
        }
    }
}

/// Sampler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub interval: Duration,
    pub policy: StopPolicy,
}

// ============================================================================
// Shutdown Signal
// ============================================================================

/// Fires the shutdown signal
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Request that sampling stop as soon as possible
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half of the shutdown signal
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_trigger, signal) = shutdown_channel();
        signal
    }

    /// Whether shutdown has been requested
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been requested
    ///
    /// If the trigger is dropped without firing, this never resolves.
    pub async fn triggered(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                if *self.rx.borrow() {
                    return;
                }
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a connected trigger/signal pair
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

// ============================================================================
// Sink
// ============================================================================

/// What happened on one sampling attempt
#[derive(Debug, Clone, Copy)]
pub enum SampleEvent<'a> {
    /// The fetch succeeded and this snapshot was appended
    Recorded(&'a ResourceSnapshot),
    /// The fetch failed; only the timing is known
    Missed {
        timestamp: DateTime<Utc>,
        elapsed_ms: i64,
    },
}

impl<'a> SampleEvent<'a> {
    pub fn elapsed_ms(&self) -> i64 {
        match self {
            SampleEvent::Recorded(snapshot) => snapshot.elapsed_ms,
            SampleEvent::Missed { elapsed_ms, .. } => *elapsed_ms,
        }
    }

    pub fn snapshot(&self) -> Option<&'a ResourceSnapshot> {
        match self {
            SampleEvent::Recorded(snapshot) => Some(snapshot),
            SampleEvent::Missed { .. } => None,
        }
    }
}

/// Observer notified synchronously after every sampling attempt
pub trait SnapshotSink {
    /// `index` counts attempts from zero, including missed ones
    fn on_sample(&mut self, event: SampleEvent<'_>, index: u64);
}

/// Sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl SnapshotSink for NoopSink {
    fn on_sample(&mut self, _event: SampleEvent<'_>, _index: u64) {}
}

// ============================================================================
// Outcome
// ============================================================================

/// Why a sampling session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every scheduled iteration ran
    Completed,
    /// Until-full mode saw both `used` counters at zero
    FullyRecovered,
    /// The shutdown signal fired
    Cancelled,
}

/// Series collected by a session and how the session ended
#[derive(Debug, Clone)]
pub struct SamplingOutcome {
    /// Recorded snapshots, ordered by elapsed time
    pub snapshots: Vec<ResourceSnapshot>,
    pub termination: Termination,
    /// Fetch attempts made, including missed ones
    pub attempts: u64,
    /// Fetch attempts that failed
    pub missed: u64,
}

impl SamplingOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.termination == Termination::Cancelled
    }

    /// `Err(Error::Cancelled)` for a cancelled session, otherwise the termination
    ///
    /// The snapshots stay on the outcome either way.
    pub fn status(&self) -> Result<Termination> {
        match self.termination {
            Termination::Cancelled => Err(Error::Cancelled),
            other => Ok(other),
        }
    }
}

// ============================================================================
// Sampler
// ============================================================================

/// Interval-paced, cancellable sampler for one account
pub struct Sampler<F> {
    fetcher: F,
    account: String,
    config: SamplerConfig,
}

/// Running counters for a session
#[derive(Default)]
struct Tally {
    attempts: u64,
    missed: u64,
}

impl<F: ResourceFetcher> Sampler<F> {
    pub fn new(fetcher: F, account: impl Into<String>, config: SamplerConfig) -> Self {
        Self {
            fetcher,
            account: account.into(),
            config,
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Run one session to completion, early recovery, or shutdown
    pub async fn run<S>(&self, sink: &mut S, mut shutdown: ShutdownSignal) -> SamplingOutcome
    where
        S: SnapshotSink + ?Sized,
    {
        let iterations = self.config.policy.max_iterations(self.config.interval);
        log::info!(
            "[sampler] Starting {:?} for {} via {} ({} iterations, {}ms interval)",
            self.config.policy,
            self.account,
            self.fetcher.fetcher_id(),
            iterations,
            self.config.interval.as_millis()
        );

        let mut snapshots = Vec::with_capacity(iterations.min(4096) as usize);
        let mut tally = Tally::default();
        let termination = self
            .sample_into(&mut snapshots, &mut tally, iterations, sink, &mut shutdown)
            .await;

        log::info!(
            "[sampler] Finished ({:?}): {} recorded, {} missed",
            termination,
            snapshots.len(),
            tally.missed
        );

        SamplingOutcome {
            snapshots,
            termination,
            attempts: tally.attempts,
            missed: tally.missed,
        }
    }

    async fn sample_into<S>(
        &self,
        snapshots: &mut Vec<ResourceSnapshot>,
        tally: &mut Tally,
        iterations: u64,
        sink: &mut S,
        shutdown: &mut ShutdownSignal,
    ) -> Termination
    where
        S: SnapshotSink + ?Sized,
    {
        let start = Instant::now();

        for index in 0..iterations {
            if shutdown.is_triggered() {
                return Termination::Cancelled;
            }

            let tick_start = Instant::now();
            let fetched = tokio::select! {
                biased;
                _ = shutdown.triggered() => return Termination::Cancelled,
                result = self.fetcher.fetch(&self.account) => result,
            };
            tally.attempts += 1;

            let timestamp = Utc::now();
            let elapsed_ms = start.elapsed().as_millis() as i64;

            match fetched {
                Ok(reading) => {
                    let snapshot = ResourceSnapshot::from_reading(
                        reading,
                        timestamp,
                        elapsed_ms,
                        snapshots.last(),
                    );
                    let done = self.config.policy.should_stop(&snapshot);
                    snapshots.push(snapshot);
                    if let Some(recorded) = snapshots.last() {
                        sink.on_sample(SampleEvent::Recorded(recorded), index);
                    }
                    if done {
                        log::info!("[sampler] Resources fully recovered at {}ms", elapsed_ms);
                        return Termination::FullyRecovered;
                    }
                }
                Err(e) => {
                    tally.missed += 1;
                    log::warn!("[sampler] Missed sample {}: {}", index, e);
                    sink.on_sample(
                        SampleEvent::Missed {
                            timestamp,
                            elapsed_ms,
                        },
                        index,
                    );
                }
            }

            if index + 1 < iterations {
                tokio::select! {
                    biased;
                    _ = shutdown.triggered() => return Termination::Cancelled,
                    _ = tokio::time::sleep_until(tick_start + self.config.interval) => {}
                }
            }
        }

        Termination::Completed
    }
}

// ============================================================================
// Tests
// ============================================================================
