//! cachesplit - optimal cache write placement for token streams
//!
//! Finds where to write a prompt cache in a stream of tokens so the modeled
//! processing cost is lowest, and how many writes are worth making.
//!
//! # Example
//!
//! ```rust
//! use cachesplit::prelude::*;
//!
//! let config = SweepConfig::new()
//!     .with_sequence_length(12)
//!     .with_max_splits(3);
//! let report = run_sweep_with_config(&config).unwrap();
//!
//! assert_eq!(report.outcome.results.len(), 3);
//! assert!(report.outcome.optimal_cost() < report.reference_cost);
//! ```

pub use cachesplit_config::{
    BounderType, ConfigError, SweepConfig, ThreadCountConfig, TrackerConfig,
};
pub use cachesplit_core::{
    cost_trace, reference_cost, simulate, BestResult, CacheSession, PolicyComparison,
    PolicyError, RatioTracker, SearchError, SplitAssignment,
};
pub use cachesplit_solver::{
    find_optimal_n, optimize_splits, LowerBoundEstimator, NoBound, OuterSweep,
    ParallelOrchestrator, SearchStats, SplitCountResult, StructuralBound, SweepOutcome,
    ThreadCount,
};

#[cfg(feature = "console")]
pub use cachesplit_console as console;

mod solver;
pub use solver::{
    run_policy_study, run_sweep, run_sweep_from, run_sweep_with_channel, run_sweep_with_config,
    Error, SweepReport, CONFIG_FILE,
};

pub mod prelude {
    pub use super::{
        find_optimal_n, optimize_splits, run_sweep, run_sweep_with_config, simulate,
        BestResult, SweepConfig, SweepOutcome, SweepReport,
    };
}
