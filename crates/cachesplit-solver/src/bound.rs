//! Lower bound estimators for search pruning.
//!
//! An estimator guesses how much cost any completion of a partial assignment
//! still has to pay. A child whose estimate is not strictly below the best
//! complete cost found so far is pruned.

use std::fmt::Debug;

use cachesplit_core::{CACHED_TOKEN_PRICE, PRICE_DIVISOR, UNCACHED_TOKEN_PRICE};
use cachesplit_config::BounderType;

/// Estimates the cost still to be paid by completions of a partial assignment.
///
/// Implementations are shared by all search workers.
pub trait LowerBoundEstimator: Send + Sync + Debug {
    /// Returns the estimate for `prefix[..depth]` within a stream of
    /// `sequence_length` positions and `split_count` splits in total.
    fn estimate_min_cost(
        &self,
        prefix: &[usize],
        depth: usize,
        sequence_length: usize,
        split_count: usize,
    ) -> f64;

    /// Returns the bounder type this estimator implements.
    fn bounder_type(&self) -> BounderType;
}

/// Structural estimate: every remaining split is charged for every remaining
/// position at a rate that grows with depth.
///
/// `(N - depth) * (L - last_split) * (3 + 0.3 * depth) / 1e6`
///
/// This is not a proven admissible bound. Changing the formula changes which
/// branches are explored and can change search results.
///
/// # Panics
///
/// Panics if `depth > prefix.len()`. Debug builds also panic unless
/// `depth <= split_count` and `prefix[depth - 1] <= sequence_length`; the
/// explorer only asks for states that satisfy both.
///
/// # Examples
///
/// ```
/// use cachesplit_solver::{LowerBoundEstimator, StructuralBound};
///
/// let bound = StructuralBound;
/// assert_eq!(bound.estimate_min_cost(&[], 0, 10, 3), 0.0);
/// assert!(bound.estimate_min_cost(&[2], 1, 10, 3) > 0.0);
/// assert_eq!(bound.estimate_min_cost(&[2, 5, 7], 3, 10, 3), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralBound;

impl LowerBoundEstimator for StructuralBound {
    fn estimate_min_cost(
        &self,
        prefix: &[usize],
        depth: usize,
        sequence_length: usize,
        split_count: usize,
    ) -> f64 {
        if depth == 0 {
            return 0.0;
        }
        debug_assert!(
            depth <= split_count,
            "depth {depth} exceeds split count {split_count}"
        );
        let last_split = prefix[depth - 1];
        debug_assert!(
            last_split <= sequence_length,
            "split {last_split} beyond sequence length {sequence_length}"
        );
        let remaining_splits = split_count - depth;
        let remaining_length = sequence_length - last_split;
        (remaining_splits * remaining_length) as f64
            * (UNCACHED_TOKEN_PRICE + CACHED_TOKEN_PRICE * depth as f64)
            / PRICE_DIVISOR
    }

    fn bounder_type(&self) -> BounderType {
        BounderType::Structural
    }
}

/// Estimates zero everywhere, so nothing is pruned while the best is finite
/// and positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBound;

impl LowerBoundEstimator for NoBound {
    fn estimate_min_cost(&self, _: &[usize], _: usize, _: usize, _: usize) -> f64 {
        0.0
    }

    fn bounder_type(&self) -> BounderType {
        BounderType::None
    }
}
