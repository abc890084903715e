//! Parallel distribution of first splits.
//!
//! Every value of the first split is an independent unit of work. Units are
//! handed to rayon, whose work stealing adapts chunk sizes to the very uneven
//! subtree sizes. Each worker folds its units into a private running best
//! that also serves as the pruning threshold for its next unit; the private
//! bests are then merged into one global best under a mutex.
//!
//! # Example
//!
//! ```
//! use cachesplit_solver::parallel::{ParallelOrchestrator, ThreadCount};
//! use cachesplit_solver::StructuralBound;
//!
//! let orchestrator = ParallelOrchestrator::new(StructuralBound)
//!     .with_thread_count(ThreadCount::Specific(2))
//!     .unwrap();
//! let search = orchestrator.optimize_splits(2, 12);
//!
//! assert_eq!(search.best.assignment.len(), 2);
//! ```

use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use cachesplit_core::{simulate, BestResult, Result, SearchError};
use cachesplit_config::ThreadCountConfig;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::bound::{LowerBoundEstimator, StructuralBound};
use crate::explorer::SearchExplorer;
use crate::stats::SearchStats;

/// Worker count for the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadCount {
    /// Use rayon's global pool (one worker per available core).
    #[default]
    Auto,
    /// Run every unit on the calling thread.
    Sequential,
    /// Use a dedicated pool with this many workers.
    Specific(usize),
}

impl ThreadCount {
    /// Resolves the thread count to an actual number of workers.
    pub fn resolve(&self) -> usize {
        match self {
            ThreadCount::Auto => rayon::current_num_threads(),
            ThreadCount::Sequential => 1,
            ThreadCount::Specific(n) => (*n).max(1),
        }
    }
}

impl From<ThreadCountConfig> for ThreadCount {
    fn from(config: ThreadCountConfig) -> Self {
        match config {
            ThreadCountConfig::Auto => ThreadCount::Auto,
            ThreadCountConfig::None => ThreadCount::Sequential,
            ThreadCountConfig::Count(n) => ThreadCount::Specific(n),
        }
    }
}

impl std::fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadCount::Auto => write!(f, "Auto"),
            ThreadCount::Sequential => write!(f, "Sequential"),
            ThreadCount::Specific(n) => write!(f, "{}", n),
        }
    }
}

/// Best assignment for one split count, with the counters of all workers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSearch {
    /// The cheapest assignment found, or the infeasible record.
    pub best: BestResult,
    /// Merged counters of every worker.
    pub stats: SearchStats,
}

impl SplitSearch {
    fn merge(&mut self, other: SplitSearch) {
        self.best.merge(other.best);
        self.stats.merge(&other.stats);
    }
}

/// Distributes the first split over workers and reduces their results.
///
/// The returned cost is deterministic. When several assignments share the
/// minimum cost, which one is returned depends on the order workers finish
/// and is not stable across runs with more than one worker.
pub struct ParallelOrchestrator<B> {
    bound: B,
    thread_count: ThreadCount,
    pool: Option<ThreadPool>,
}

impl<B: Debug> Debug for ParallelOrchestrator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelOrchestrator")
            .field("bound", &self.bound)
            .field("thread_count", &self.thread_count)
            .finish()
    }
}

impl<B: LowerBoundEstimator> ParallelOrchestrator<B> {
    /// Creates an orchestrator on rayon's global pool.
    pub fn new(bound: B) -> Self {
        Self {
            bound,
            thread_count: ThreadCount::Auto,
            pool: None,
        }
    }

    /// Sets the worker count, building a dedicated pool when one is needed.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ThreadPool`] if the pool cannot be built.
    pub fn with_thread_count(mut self, thread_count: ThreadCount) -> Result<Self> {
        self.pool = match thread_count {
            ThreadCount::Specific(n) if n > 1 => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("cachesplit-worker-{i}"))
                    .build()
                    .map_err(|e| SearchError::ThreadPool(e.to_string()))?,
            ),
            _ => None,
        };
        self.thread_count = thread_count;
        Ok(self)
    }

    /// Returns the bound used for pruning.
    pub fn bound(&self) -> &B {
        &self.bound
    }

    /// Returns the configured worker count.
    pub fn thread_count(&self) -> ThreadCount {
        self.thread_count
    }

    /// Finds the cheapest placement of `split_count` splits in
    /// `sequence_length` positions.
    ///
    /// Zero splits yield the empty assignment at the no-cache cost. More
    /// splits than positions yield the infeasible record.
    pub fn optimize_splits(&self, split_count: usize, sequence_length: usize) -> SplitSearch {
        if split_count == 0 {
            return SplitSearch {
                best: BestResult::new(simulate(&[], sequence_length), Vec::new()),
                stats: SearchStats::default(),
            };
        }
        if split_count > sequence_length {
            debug!(
                event = "infeasible",
                splits = split_count,
                sequence_length,
            );
            return SplitSearch::default();
        }

        let last_first_split = sequence_length - split_count;
        let sequential = matches!(self.thread_count, ThreadCount::Sequential)
            || matches!(self.thread_count, ThreadCount::Specific(n) if n <= 1);

        if sequential {
            let mut worker = Worker::new(&self.bound, sequence_length, split_count);
            for first_split in 0..=last_first_split {
                worker.run_unit(first_split);
            }
            return worker.finish();
        }

        let global = Mutex::new(SplitSearch::default());
        let run = || {
            (0..=last_first_split)
                .into_par_iter()
                .fold(
                    || Worker::new(&self.bound, sequence_length, split_count),
                    |mut worker, first_split| {
                        worker.run_unit(first_split);
                        worker
                    },
                )
                .for_each(|worker| {
                    let local = worker.finish();
                    global
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .merge(local);
                });
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }

        global.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

// Private running best plus a reusable explorer.
struct Worker<'a, B> {
    explorer: SearchExplorer<'a, B>,
    best: BestResult,
}

impl<'a, B: LowerBoundEstimator> Worker<'a, B> {
    fn new(bound: &'a B, sequence_length: usize, split_count: usize) -> Self {
        Self {
            explorer: SearchExplorer::new(bound, sequence_length, split_count),
            best: BestResult::infeasible(),
        }
    }

    fn run_unit(&mut self, first_split: usize) {
        self.explorer.explore_into(first_split, &mut self.best);
        debug!(
            event = "unit_end",
            first_split,
            cost = self.best.cost,
            frames = self.explorer.stats().frames_popped,
        );
    }

    fn finish(self) -> SplitSearch {
        SplitSearch {
            best: self.best,
            stats: self.explorer.into_stats(),
        }
    }
}

/// Finds the cheapest placement of `split_count` splits with the structural
/// bound on rayon's global pool.
///
/// # Examples
///
/// ```
/// use cachesplit_core::simulate;
/// use cachesplit_solver::optimize_splits;
///
/// let best = optimize_splits(1, 4);
/// let exhaustive = (0..4).map(|j| simulate(&[j], 4)).fold(f64::INFINITY, f64::min);
/// assert_eq!(best.cost, exhaustive);
/// ```
pub fn optimize_splits(split_count: usize, sequence_length: usize) -> BestResult {
    ParallelOrchestrator::new(StructuralBound)
        .optimize_splits(split_count, sequence_length)
        .best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::NoBound;

    #[test]
    fn test_thread_count_default() {
        assert_eq!(ThreadCount::default(), ThreadCount::Auto);
    }

    #[test]
    fn test_thread_count_display() {
        assert_eq!(format!("{}", ThreadCount::Auto), "Auto");
        assert_eq!(format!("{}", ThreadCount::Sequential), "Sequential");
        assert_eq!(format!("{}", ThreadCount::Specific(4)), "4");
    }

    #[test]
    fn test_thread_count_resolve() {
        assert_eq!(ThreadCount::Sequential.resolve(), 1);
        assert_eq!(ThreadCount::Specific(3).resolve(), 3);
        assert_eq!(ThreadCount::Specific(0).resolve(), 1);
        assert!(ThreadCount::Auto.resolve() > 0);
    }

    #[test]
    fn test_thread_count_from_config() {
        assert_eq!(ThreadCount::from(ThreadCountConfig::Auto), ThreadCount::Auto);
        assert_eq!(
            ThreadCount::from(ThreadCountConfig::None),
            ThreadCount::Sequential
        );
        assert_eq!(
            ThreadCount::from(ThreadCountConfig::Count(6)),
            ThreadCount::Specific(6)
        );
    }

    #[test]
    fn test_zero_splits_is_baseline() {
        let search = ParallelOrchestrator::new(StructuralBound).optimize_splits(0, 5);
        assert!(search.best.assignment.is_empty());
        assert_eq!(search.best.cost, simulate(&[], 5));
        assert_eq!(search.stats, SearchStats::default());
    }

    #[test]
    fn test_more_splits_than_positions_is_infeasible() {
        let search = ParallelOrchestrator::new(StructuralBound).optimize_splits(4, 3);
        assert!(!search.best.is_feasible());
        assert!(search.best.assignment.is_empty());
    }

    #[test]
    fn test_all_positions_split() {
        let best = optimize_splits(4, 4);
        assert_eq!(best.assignment, vec![0, 1, 2, 3]);
        assert_eq!(best.cost, simulate(&[0, 1, 2, 3], 4));
    }

    #[test]
    fn test_sequential_and_parallel_agree_on_cost() {
        let sequential = ParallelOrchestrator::new(StructuralBound)
            .with_thread_count(ThreadCount::Sequential)
            .unwrap()
            .optimize_splits(3, 18);
        let parallel = ParallelOrchestrator::new(StructuralBound)
            .with_thread_count(ThreadCount::Specific(4))
            .unwrap()
            .optimize_splits(3, 18);
        assert_eq!(sequential.best.cost, parallel.best.cost);
        assert_eq!(sequential.stats.units, 16);
        assert_eq!(parallel.stats.units, 16);
    }

    #[test]
    fn test_pruning_agrees_with_unbounded_search() {
        for splits in 1..=3 {
            let pruned = ParallelOrchestrator::new(StructuralBound).optimize_splits(splits, 11);
            let full = ParallelOrchestrator::new(NoBound).optimize_splits(splits, 11);
            assert_eq!(pruned.best.cost, full.best.cost, "{splits} splits");
            assert!(pruned.stats.leaves_evaluated <= full.stats.leaves_evaluated);
        }
    }

    #[test]
    fn test_orchestrator_debug() {
        let orchestrator = ParallelOrchestrator::new(StructuralBound);
        let debug = format!("{:?}", orchestrator);
        assert!(debug.contains("ParallelOrchestrator"));
        assert!(debug.contains("StructuralBound"));
    }
}
