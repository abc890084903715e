//! Cache split search engine
//!
//! This crate provides the branch-and-bound search for cache write positions:
//! - Lower bound estimators used for pruning
//! - Explicit-stack depth-first exploration from one first split
//! - Parallel distribution of first splits across workers
//! - The sweep over split counts
//! - Search statistics

pub mod bound;
pub mod explorer;
pub mod parallel;
pub mod stats;
pub mod sweep;

pub use bound::{LowerBoundEstimator, NoBound, StructuralBound};
pub use explorer::{SearchExplorer, SearchState};
pub use parallel::{optimize_splits, ParallelOrchestrator, SplitSearch, ThreadCount};
pub use stats::SearchStats;
pub use sweep::{find_optimal_n, OuterSweep, SplitCountResult, SweepOutcome};
