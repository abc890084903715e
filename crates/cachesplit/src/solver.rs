//! Config-driven entry points.
//!
//! Logging levels:
//! - **INFO**: Sweep start/end, per split count summaries, policy comparisons
//! - **DEBUG**: First-split unit completion
//! - **TRACE**: Running best improvements

use cachesplit_config::{BounderType, ConfigError, SweepConfig, TrackerConfig};
use cachesplit_core::policy::{compare_with_baseline, random_workload, seeded_workload};
use cachesplit_core::{reference_cost, PolicyComparison, PolicyError, SearchError};
use cachesplit_solver::{
    LowerBoundEstimator, NoBound, OuterSweep, ParallelOrchestrator, SplitCountResult,
    StructuralBound, SweepOutcome, ThreadCount,
};
use std::io;
use std::path::Path;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

/// Config file read by [`run_sweep`].
pub const CONFIG_FILE: &str = "sweep.toml";

/// Error from a config-driven run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Everything a config-driven run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    /// The split count sweep.
    pub outcome: SweepOutcome,
    /// Fully uncached cost of the same context, for comparison.
    pub reference_cost: f64,
    /// One comparison per configured threshold; empty without a tracker section.
    pub policy: Vec<PolicyComparison>,
}

/// Runs the sweep configured by `sweep.toml` in the working directory, or the
/// defaults when there is no such file.
pub fn run_sweep() -> Result<SweepReport, Error> {
    run_sweep_from(CONFIG_FILE)
}

/// Runs the sweep configured by the TOML file at `path`, or the defaults when
/// the file does not exist.
///
/// # Errors
///
/// A file that exists but cannot be read, parsed or validated is an error;
/// it never falls back to the defaults.
pub fn run_sweep_from(path: impl AsRef<Path>) -> Result<SweepReport, Error> {
    let config = match SweepConfig::load(path) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => SweepConfig::default(),
        Err(e) => return Err(e.into()),
    };
    run_sweep_with_config(&config)
}

/// Runs the sweep (and the policy study, if configured) for `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the worker pool cannot
/// be built.
pub fn run_sweep_with_config(config: &SweepConfig) -> Result<SweepReport, Error> {
    config.validate()?;
    let outcome = match config.bounder {
        BounderType::Structural => sweep_with(StructuralBound, config, None)?,
        BounderType::None => sweep_with(NoBound, config, None)?,
    };
    finish(config, outcome)
}

/// Same as [`run_sweep_with_config`], streaming each split count's record
/// through `sender` as it is solved.
pub fn run_sweep_with_channel(
    config: &SweepConfig,
    sender: mpsc::UnboundedSender<SplitCountResult>,
) -> Result<SweepReport, Error> {
    config.validate()?;
    let outcome = match config.bounder {
        BounderType::Structural => sweep_with(StructuralBound, config, Some(sender))?,
        BounderType::None => sweep_with(NoBound, config, Some(sender))?,
    };
    finish(config, outcome)
}

/// Replays one workload under every configured threshold.
///
/// All thresholds see the same workload; it is drawn from `tracker.seed`
/// when set and from the thread-local generator otherwise.
pub fn run_policy_study(tracker: &TrackerConfig) -> Result<Vec<PolicyComparison>, Error> {
    let workload = match tracker.seed {
        Some(seed) => seeded_workload(
            seed,
            tracker.iterations,
            tracker.min_tokens,
            tracker.max_tokens,
        )?,
        None => random_workload(
            &mut rand::rng(),
            tracker.iterations,
            tracker.min_tokens,
            tracker.max_tokens,
        )?,
    };

    Ok(tracker
        .pi_values
        .iter()
        .map(|&pi| {
            let comparison = compare_with_baseline(pi, &workload);
            info!(
                event = "policy_end",
                pi,
                tracker_cost = comparison.tracker_cost,
                baseline_cost = comparison.baseline_cost,
                ratio = comparison.final_ratio(),
            );
            comparison
        })
        .collect())
}

fn sweep_with<B: LowerBoundEstimator>(
    bound: B,
    config: &SweepConfig,
    sender: Option<mpsc::UnboundedSender<SplitCountResult>>,
) -> Result<SweepOutcome, SearchError> {
    let orchestrator =
        ParallelOrchestrator::new(bound).with_thread_count(ThreadCount::from(config.thread_count))?;
    let sweep = OuterSweep::new(orchestrator);
    match sender {
        Some(sender) => sweep.run_with_channel(config.max_splits, config.sequence_length, sender),
        None => sweep.run(config.max_splits, config.sequence_length),
    }
}

fn finish(config: &SweepConfig, outcome: SweepOutcome) -> Result<SweepReport, Error> {
    let policy = match &config.tracker {
        Some(tracker) => run_policy_study(tracker)?,
        None => Vec::new(),
    };
    Ok(SweepReport {
        reference_cost: reference_cost(config.sequence_length),
        outcome,
        policy,
    })
}
