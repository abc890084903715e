//! Cache Split Sweep Example
//!
//! Searches for the cheapest number and placement of cache writes in a token
//! stream, reading `sweep.toml` from the working directory when present. A
//! `sweep.toml` that fails to parse or validate aborts the run:
//!
//! ```toml
//! sequence_length = 100
//! max_splits = 7
//!
//! [tracker]
//! seed = 42
//! ```

use std::process::ExitCode;

use cachesplit::prelude::*;

fn main() -> ExitCode {
    cachesplit::console::init();

    let report = match run_sweep() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("sweep failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = &report.outcome;
    println!(
        "Optimal N: {}, Cost: {}, Splits: {:?}",
        outcome.optimal_split_count,
        outcome.optimal_cost(),
        outcome.optimal_assignment()
    );
    println!(
        "Execution time: {:.3} seconds",
        outcome.duration.as_secs_f64()
    );
    println!("Cost per input: {}USD", report.reference_cost);

    for comparison in &report.policy {
        println!(
            "Tracker cost: ${:.3}, Baseline cost: ${:.3}, Cost ratio: {:.3} (pi = {})",
            comparison.tracker_cost,
            comparison.baseline_cost,
            comparison.final_ratio(),
            comparison.pi
        );
    }

    ExitCode::SUCCESS
}
