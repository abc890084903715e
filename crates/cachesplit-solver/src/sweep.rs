//! Sweep over split counts.
//!
//! Each split count in `1..=max_splits` is solved independently and fully;
//! nothing learned for one count prunes another. The overall optimum is the
//! strictly cheapest feasible count, so on a cost tie the smaller count wins.

use std::time::{Duration, Instant};

use cachesplit_core::{BestResult, Result, SearchError};
use tokio::sync::mpsc;
use tracing::info;

use crate::bound::{LowerBoundEstimator, StructuralBound};
use crate::parallel::ParallelOrchestrator;
use crate::stats::SearchStats;

/// Outcome for one split count.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitCountResult {
    /// Number of splits placed.
    pub split_count: usize,
    /// Cheapest assignment, or the infeasible record.
    pub best: BestResult,
    /// Counters merged over all workers.
    pub stats: SearchStats,
    /// Wall time spent on this count.
    pub duration: Duration,
}

/// Outcome of a whole sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    /// Number of positions searched.
    pub sequence_length: usize,
    /// Split count of the overall optimum.
    pub optimal_split_count: usize,
    /// The overall optimum.
    pub best: BestResult,
    /// One record per split count, in ascending order.
    pub results: Vec<SplitCountResult>,
    /// Wall time of the whole sweep.
    pub duration: Duration,
}

impl SweepOutcome {
    /// Returns the optimal cost.
    pub fn optimal_cost(&self) -> f64 {
        self.best.cost
    }

    /// Returns the optimal assignment.
    pub fn optimal_assignment(&self) -> &[usize] {
        &self.best.assignment
    }

    /// Returns the record for `split_count`, if it was swept.
    pub fn result_for(&self, split_count: usize) -> Option<&SplitCountResult> {
        self.results.iter().find(|r| r.split_count == split_count)
    }

    /// Returns the counters summed over every split count.
    pub fn total_stats(&self) -> SearchStats {
        self.results.iter().fold(SearchStats::default(), |mut total, r| {
            total.merge(&r.stats);
            total
        })
    }
}

/// Runs the orchestrator for every split count and keeps the cheapest.
#[derive(Debug)]
pub struct OuterSweep<B> {
    orchestrator: ParallelOrchestrator<B>,
}

impl<B: LowerBoundEstimator> OuterSweep<B> {
    /// Creates a sweep driven by `orchestrator`.
    pub fn new(orchestrator: ParallelOrchestrator<B>) -> Self {
        Self { orchestrator }
    }

    /// Returns the orchestrator.
    pub fn orchestrator(&self) -> &ParallelOrchestrator<B> {
        &self.orchestrator
    }

    /// Finds the cheapest split count in `1..=max_splits` and its placement.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptySequence`] for a zero `sequence_length` and
    /// [`SearchError::NoSplitCounts`] for a zero `max_splits`.
    pub fn run(&self, max_splits: usize, sequence_length: usize) -> Result<SweepOutcome> {
        self.sweep(max_splits, sequence_length, |_| {})
    }

    /// Same as [`run`](Self::run), also sending each split count's record
    /// through `sender` as soon as it is solved.
    ///
    /// A closed receiver does not stop the sweep.
    pub fn run_with_channel(
        &self,
        max_splits: usize,
        sequence_length: usize,
        sender: mpsc::UnboundedSender<SplitCountResult>,
    ) -> Result<SweepOutcome> {
        self.sweep(max_splits, sequence_length, |result| {
            let _ = sender.send(result.clone());
        })
    }

    fn sweep<F>(
        &self,
        max_splits: usize,
        sequence_length: usize,
        mut on_result: F,
    ) -> Result<SweepOutcome>
    where
        F: FnMut(&SplitCountResult),
    {
        if sequence_length == 0 {
            return Err(SearchError::EmptySequence);
        }
        if max_splits == 0 {
            return Err(SearchError::NoSplitCounts);
        }

        let start = Instant::now();
        info!(
            event = "sweep_start",
            sequence_length,
            max_splits,
            thread_count = self.orchestrator.thread_count().resolve(),
            bounder = %self.orchestrator.bound().bounder_type(),
        );

        let mut best = BestResult::infeasible();
        let mut optimal_split_count = 0;
        let mut results = Vec::with_capacity(max_splits);

        for split_count in 1..=max_splits {
            let count_start = Instant::now();
            let search = self.orchestrator.optimize_splits(split_count, sequence_length);
            let result = SplitCountResult {
                split_count,
                best: search.best,
                stats: search.stats,
                duration: count_start.elapsed(),
            };

            info!(
                event = "split_count_end",
                splits = split_count,
                feasible = result.best.is_feasible(),
                cost = result.best.cost,
                assignment = ?result.best.assignment,
                frames = result.stats.frames_popped,
                pruned = result.stats.children_pruned,
                duration_ms = result.duration.as_millis() as u64,
            );

            if result.best.is_feasible() && best.is_improved_by(result.best.cost) {
                best = result.best.clone();
                optimal_split_count = split_count;
            }

            on_result(&result);
            results.push(result);
        }

        let duration = start.elapsed();
        info!(
            event = "sweep_end",
            splits = optimal_split_count,
            cost = best.cost,
            assignment = ?best.assignment,
            duration_ms = duration.as_millis() as u64,
        );

        Ok(SweepOutcome {
            sequence_length,
            optimal_split_count,
            best,
            results,
            duration,
        })
    }
}

/// Sweeps split counts `1..=max_splits` with the structural bound on rayon's
/// global pool.
///
/// # Examples
///
/// ```
/// use cachesplit_solver::find_optimal_n;
///
/// let outcome = find_optimal_n(3, 10).unwrap();
/// assert_eq!(outcome.results.len(), 3);
/// assert_eq!(outcome.optimal_assignment().len(), outcome.optimal_split_count);
/// ```
pub fn find_optimal_n(max_splits: usize, sequence_length: usize) -> Result<SweepOutcome> {
    OuterSweep::new(ParallelOrchestrator::new(StructuralBound)).run(max_splits, sequence_length)
}
