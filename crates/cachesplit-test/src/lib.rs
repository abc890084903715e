//! Shared test fixtures for cachesplit crates.
//!
//! Brute-force references the search is checked against. Everything here
//! enumerates the full search space and is only usable for small instances.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! cachesplit-test = { workspace = true }
//! ```

use cachesplit_core::{simulate, BestResult, SplitAssignment};

/// Returns every strictly increasing assignment of `split_count` positions in
/// `0..sequence_length`, in lexicographic order.
///
/// ```
/// use cachesplit_test::all_assignments;
///
/// assert_eq!(
///     all_assignments(2, 3),
///     vec![vec![0, 1], vec![0, 2], vec![1, 2]]
/// );
/// ```
pub fn all_assignments(split_count: usize, sequence_length: usize) -> Vec<SplitAssignment> {
    let mut out = Vec::new();
    if split_count > sequence_length {
        return out;
    }
    let mut current = Vec::with_capacity(split_count);
    extend(&mut current, 0, split_count, sequence_length, &mut out);
    out
}

fn extend(
    current: &mut Vec<usize>,
    from: usize,
    split_count: usize,
    sequence_length: usize,
    out: &mut Vec<SplitAssignment>,
) {
    if current.len() == split_count {
        out.push(current.clone());
        return;
    }
    let remaining = split_count - current.len();
    for position in from..=sequence_length - remaining {
        current.push(position);
        extend(current, position + 1, split_count, sequence_length, out);
        current.pop();
    }
}

/// Returns the cheapest assignment by exhaustive enumeration, keeping the
/// lexicographically first one on ties.
pub fn exhaustive_minimum(split_count: usize, sequence_length: usize) -> BestResult {
    let mut best = BestResult::infeasible();
    for assignment in all_assignments(split_count, sequence_length) {
        let cost = simulate(&assignment, sequence_length);
        best.offer(cost, &assignment);
    }
    best
}

/// Returns every assignment whose cost equals the exhaustive minimum.
pub fn optimal_assignments(split_count: usize, sequence_length: usize) -> Vec<SplitAssignment> {
    let best = exhaustive_minimum(split_count, sequence_length);
    all_assignments(split_count, sequence_length)
        .into_iter()
        .filter(|a| simulate(a, sequence_length) == best.cost)
        .collect()
}

/// Number of ways to choose `k` of `n`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    (0..k.min(n - k)).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_count_matches_binomial() {
        for n in 0..=7 {
            for k in 0..=n + 1 {
                assert_eq!(all_assignments(k, n).len(), binomial(n, k), "C({n}, {k})");
            }
        }
    }

    #[test]
    fn test_zero_splits_has_one_empty_assignment() {
        assert_eq!(all_assignments(0, 4), vec![Vec::<usize>::new()]);
        let best = exhaustive_minimum(0, 4);
        assert!(best.assignment.is_empty());
        assert_eq!(best.cost, simulate(&[], 4));
    }

    #[test]
    fn test_infeasible_minimum() {
        assert!(!exhaustive_minimum(3, 2).is_feasible());
        assert!(optimal_assignments(3, 2).is_empty());
    }

    #[test]
    fn test_optimal_assignments_contains_minimum() {
        let best = exhaustive_minimum(2, 6);
        assert!(optimal_assignments(2, 6).contains(&best.assignment));
    }
}
