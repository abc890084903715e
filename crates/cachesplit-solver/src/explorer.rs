//! Explicit-stack depth-first exploration.
//!
//! One exploration fixes the first split and enumerates every strictly
//! increasing completion, pruning children whose bound cannot beat the
//! running best. Frames are popped LIFO, so the last child pushed (the
//! latest next split) is explored first.

use cachesplit_core::{simulate, BestResult};
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::bound::LowerBoundEstimator;
use crate::stats::SearchStats;

/// Fixed split positions held inline before spilling to the heap.
pub type Prefix = SmallVec<[usize; 8]>;

/// One frame of the work stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Number of positions fixed.
    pub depth: usize,
    /// The most recently fixed position.
    pub last_split: usize,
    /// The fixed positions, `prefix.len() == depth`.
    pub prefix: Prefix,
}

impl SearchState {
    /// Creates the frame that fixes only the first split.
    pub fn root(first_split: usize) -> Self {
        Self {
            depth: 1,
            last_split: first_split,
            prefix: smallvec![first_split],
        }
    }
}

/// Depth-first branch-and-bound over completions of one first split.
///
/// The explorer owns its stack and counters and is reused across the units a
/// worker processes.
///
/// # Examples
///
/// ```
/// use cachesplit_core::simulate;
/// use cachesplit_solver::{SearchExplorer, StructuralBound};
///
/// let mut explorer = SearchExplorer::new(&StructuralBound, 6, 2);
/// let best = explorer.explore(1);
///
/// assert_eq!(best.assignment.len(), 2);
/// assert_eq!(best.assignment[0], 1);
/// assert_eq!(best.cost, simulate(&best.assignment, 6));
/// ```
#[derive(Debug)]
pub struct SearchExplorer<'a, B> {
    bound: &'a B,
    sequence_length: usize,
    split_count: usize,
    stack: Vec<SearchState>,
    stats: SearchStats,
}

impl<'a, B: LowerBoundEstimator> SearchExplorer<'a, B> {
    /// Creates an explorer for `split_count` splits in `sequence_length`
    /// positions.
    pub fn new(bound: &'a B, sequence_length: usize, split_count: usize) -> Self {
        Self {
            bound,
            sequence_length,
            split_count,
            stack: Vec::new(),
            stats: SearchStats::default(),
        }
    }

    /// Returns the best completion of `first_split`, or the infeasible record
    /// if it has none.
    pub fn explore(&mut self, first_split: usize) -> BestResult {
        let mut best = BestResult::infeasible();
        self.explore_into(first_split, &mut best);
        best
    }

    /// Explores completions of `first_split`, pruning against and improving
    /// `best`.
    ///
    /// A stronger incoming `best` prunes more. Nothing happens when no
    /// strictly increasing completion starting at `first_split` fits.
    pub fn explore_into(&mut self, first_split: usize, best: &mut BestResult) {
        let length = self.sequence_length;
        let splits = self.split_count;
        if splits == 0 || first_split + splits > length {
            return;
        }

        self.stats.units += 1;
        self.stack.clear();
        self.stack.push(SearchState::root(first_split));

        while let Some(state) = self.stack.pop() {
            self.stats.frames_popped += 1;

            if state.depth == splits {
                let cost = simulate(&state.prefix, length);
                self.stats.leaves_evaluated += 1;
                if best.offer(cost, &state.prefix) {
                    self.stats.improvements += 1;
                    trace!(
                        event = "improvement",
                        splits,
                        cost,
                        assignment = ?best.assignment,
                    );
                }
                continue;
            }

            let child_depth = state.depth + 1;
            // Leave room for the splits still to be placed after this one.
            let upper = length - (splits - state.depth);
            let mut prefix = state.prefix;

            for next in state.last_split + 1..=upper {
                prefix.push(next);
                let estimate = self
                    .bound
                    .estimate_min_cost(&prefix, child_depth, length, splits);
                if best.is_improved_by(estimate) {
                    self.stack.push(SearchState {
                        depth: child_depth,
                        last_split: next,
                        prefix: prefix.clone(),
                    });
                    self.stats.children_pushed += 1;
                } else {
                    self.stats.children_pruned += 1;
                }
                prefix.pop();
            }
        }
    }

    /// Returns the counters accumulated over every exploration so far.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Consumes the explorer, returning its counters.
    pub fn into_stats(self) -> SearchStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::{NoBound, StructuralBound};

    #[test]
    fn test_root_state() {
        let state = SearchState::root(4);
        assert_eq!(state.depth, 1);
        assert_eq!(state.last_split, 4);
        assert_eq!(state.prefix.as_slice(), &[4]);
    }

    #[test]
    fn test_single_split_evaluates_root_only() {
        let mut explorer = SearchExplorer::new(&StructuralBound, 5, 1);
        let best = explorer.explore(2);
        assert_eq!(best.assignment, vec![2]);
        assert_eq!(best.cost, simulate(&[2], 5));
        assert_eq!(explorer.stats().leaves_evaluated, 1);
        assert_eq!(explorer.stats().children_pushed, 0);
    }

    #[test]
    fn test_unbounded_enumerates_all_completions() {
        let mut explorer = SearchExplorer::new(&NoBound, 6, 3);
        let best = explorer.explore(0);
        // completions of [0, _, _] within 1..6: C(5, 2)
        assert_eq!(explorer.stats().leaves_evaluated, 10);
        assert_eq!(explorer.stats().children_pruned, 0);
        assert_eq!(best.assignment[0], 0);
        assert!(best.is_feasible());
    }

    #[test]
    fn test_best_matches_unbounded_search() {
        for first in 0..=6 {
            let pruned = SearchExplorer::new(&StructuralBound, 9, 3).explore(first);
            let full = SearchExplorer::new(&NoBound, 9, 3).explore(first);
            assert_eq!(pruned.cost, full.cost, "first split {first}");
        }
    }

    #[test]
    fn test_assignment_is_strictly_increasing() {
        let best = SearchExplorer::new(&StructuralBound, 20, 4).explore(3);
        assert_eq!(best.assignment.len(), 4);
        assert!(best.assignment.windows(2).all(|w| w[0] < w[1]));
        assert!(best.assignment.iter().all(|&p| p < 20));
    }

    #[test]
    fn test_infeasible_first_split() {
        let mut explorer = SearchExplorer::new(&StructuralBound, 5, 3);
        assert!(!explorer.explore(3).is_feasible());
        assert_eq!(explorer.stats().units, 0);
    }

    #[test]
    fn test_zero_splits_does_nothing() {
        let mut explorer = SearchExplorer::new(&StructuralBound, 5, 0);
        assert!(!explorer.explore(0).is_feasible());
    }

    #[test]
    fn test_incoming_best_is_kept_when_not_beaten() {
        let mut best = BestResult::new(0.0, vec![9]);
        let mut explorer = SearchExplorer::new(&StructuralBound, 10, 2);
        explorer.explore_into(0, &mut best);
        assert_eq!(best.assignment, vec![9]);
        assert_eq!(explorer.stats().leaves_evaluated, 0);
    }

    #[test]
    fn test_stats_accumulate_across_units() {
        let mut explorer = SearchExplorer::new(&NoBound, 6, 2);
        let mut best = BestResult::infeasible();
        explorer.explore_into(0, &mut best);
        explorer.explore_into(1, &mut best);
        let stats = explorer.into_stats();
        assert_eq!(stats.units, 2);
        // 5 completions of [0, _] and 4 of [1, _]
        assert_eq!(stats.leaves_evaluated, 9);
    }
}
