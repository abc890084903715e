//! Search results checked against exhaustive enumeration.

use cachesplit_core::{cost_trace, simulate};
use cachesplit_solver::parallel::{ParallelOrchestrator, ThreadCount};
use cachesplit_solver::{find_optimal_n, optimize_splits, NoBound, OuterSweep, StructuralBound};
use cachesplit_test::{exhaustive_minimum, optimal_assignments};

#[test]
fn test_single_split_matches_exhaustive_minimum() {
    let length = 5;
    let expected = (0..length)
        .map(|j| simulate(&[j], length))
        .fold(f64::INFINITY, f64::min);

    let best = optimize_splits(1, length);
    assert_eq!(best.cost, expected);
    assert_eq!(best.cost, simulate(&best.assignment, length));
}

#[test]
fn test_two_splits_in_six_positions_matches_exhaustive_minimum() {
    let best = optimize_splits(2, 6);
    let reference = exhaustive_minimum(2, 6);
    assert_eq!(best.cost, reference.cost);
    assert!(optimal_assignments(2, 6).contains(&best.assignment));
}

#[test]
fn test_pruned_search_matches_exhaustive_minimum_on_small_instances() {
    let orchestrator = ParallelOrchestrator::new(StructuralBound)
        .with_thread_count(ThreadCount::Specific(3))
        .unwrap();
    for length in 1..=12 {
        for splits in 1..=length.min(4) {
            let search = orchestrator.optimize_splits(splits, length);
            let reference = exhaustive_minimum(splits, length);
            assert_eq!(search.best.cost, reference.cost, "L={length} N={splits}");
            assert!(
                optimal_assignments(splits, length).contains(&search.best.assignment),
                "L={length} N={splits}: {:?}",
                search.best.assignment
            );
        }
    }
}

#[test]
fn test_four_positions_one_split_scenario() {
    // Direct application of the per-position formula.
    let by_hand = |split: usize| {
        let mut cached = 0.0;
        let mut count = 0.0;
        let mut cost = 0.0;
        for n in 0..4 {
            count += 1.0;
            cost += (3.0 * (count - cached) + 0.3 * cached) / 1e6;
            if n == split {
                cached = count;
                cost += 3.75 * cached / 1e6;
            }
        }
        cost
    };
    let costs: Vec<f64> = (0..4).map(by_hand).collect();
    for (split, cost) in costs.iter().enumerate() {
        assert!((simulate(&[split], 4) - cost).abs() < 1e-15);
    }

    let min = costs.iter().copied().fold(f64::INFINITY, f64::min);
    let best = optimize_splits(1, 4);
    assert!((best.cost - min).abs() < 1e-15);
    let argmins: Vec<usize> = (0..4)
        .filter(|&j| (costs[j] - min).abs() < 1e-15)
        .collect();
    assert!(argmins.contains(&best.assignment[0]));
}

#[test]
fn test_structural_and_unbounded_sweeps_agree() {
    let pruned = find_optimal_n(4, 14).unwrap();
    let full = OuterSweep::new(ParallelOrchestrator::new(NoBound))
        .run(4, 14)
        .unwrap();
    assert_eq!(pruned.optimal_cost(), full.optimal_cost());
    assert_eq!(pruned.optimal_split_count, full.optimal_split_count);
    for (a, b) in pruned.results.iter().zip(&full.results) {
        assert_eq!(a.best.cost, b.best.cost, "N={}", a.split_count);
    }
    assert!(pruned.total_stats().leaves_evaluated <= full.total_stats().leaves_evaluated);
}

#[test]
fn test_sweep_never_selects_infeasible_count() {
    let outcome = find_optimal_n(6, 4).unwrap();
    assert!(outcome.optimal_split_count >= 1 && outcome.optimal_split_count <= 4);
    assert_eq!(outcome.optimal_assignment().len(), outcome.optimal_split_count);
    for result in &outcome.results[4..] {
        assert!(!result.best.is_feasible());
    }
}

#[test]
fn test_optimal_cost_is_deterministic_across_runs() {
    let first = find_optimal_n(3, 20).unwrap();
    for _ in 0..3 {
        let again = find_optimal_n(3, 20).unwrap();
        assert_eq!(again.optimal_cost(), first.optimal_cost());
        assert_eq!(again.optimal_split_count, first.optimal_split_count);
    }
}

#[test]
fn test_optimal_assignment_accumulates_monotonically() {
    let outcome = find_optimal_n(3, 25).unwrap();
    let trace = cost_trace(outcome.optimal_assignment(), 25);
    assert!(trace.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(*trace.last().unwrap(), outcome.optimal_cost());
}
