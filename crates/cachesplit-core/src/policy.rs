//! Online ratio-tracker caching policy.
//!
//! Where the split search decides cache writes offline for a known stream
//! length, the ratio tracker decides them turn by turn: before each turn it
//! compares the cached context to the uncached tokens processed since the
//! last write and re-writes the cache when that ratio falls below `pi`.
//!
//! # Examples
//!
//! ```
//! use cachesplit_core::policy::{compare_with_baseline, seeded_workload};
//!
//! let workload = seeded_workload(7, 80, 100, 500).unwrap();
//! let comparison = compare_with_baseline(0.72, &workload);
//!
//! assert_eq!(comparison.ratios.len(), 80);
//! assert!(comparison.baseline_cost > comparison.tracker_cost);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cost::CacheSession;
use crate::error::PolicyError;

/// Default number of turns in a generated workload.
pub const DEFAULT_ITERATIONS: usize = 80;

/// Default smallest turn length in tokens.
pub const DEFAULT_MIN_TOKENS: u64 = 100;

/// Default largest turn length in tokens.
pub const DEFAULT_MAX_TOKENS: u64 = 500;

/// Default threshold values compared side by side.
pub const DEFAULT_PI_VALUES: [f64; 5] = [0.5, 0.72, 1.5, 2.0, 0.5];

/// A session that writes its cache whenever the cached/uncached ratio drops
/// below `pi`.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioTracker {
    session: CacheSession,
    uncached_since_write: u64,
    pi: f64,
}

impl RatioTracker {
    /// Creates a tracker with threshold `pi`.
    pub fn new(pi: f64) -> Self {
        Self {
            session: CacheSession::new(),
            uncached_since_write: 0,
            pi,
        }
    }

    /// Processes one turn of `tokens` tokens, writing the cache first if the
    /// ratio is below threshold.
    pub fn infer(&mut self, tokens: u64) {
        let ratio = if self.uncached_since_write == 0 {
            0.0
        } else {
            self.session.cached_tokens() as f64 / self.uncached_since_write as f64
        };
        if ratio < self.pi {
            self.session.make_cache();
            self.uncached_since_write = 0;
        }

        self.session.infer(tokens);
        self.uncached_since_write += self.session.token_count() - self.session.cached_tokens();
    }

    /// Returns the threshold.
    pub fn pi(&self) -> f64 {
        self.pi
    }

    /// Returns the underlying session.
    pub fn session(&self) -> &CacheSession {
        &self.session
    }

    /// Returns the cost accumulated so far.
    pub fn cost(&self) -> f64 {
        self.session.cost()
    }
}

/// Outcome of replaying one workload under the tracker and a never-caching
/// baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyComparison {
    /// Threshold the tracker ran with.
    pub pi: f64,
    /// Final tracker cost.
    pub tracker_cost: f64,
    /// Final baseline cost.
    pub baseline_cost: f64,
    /// Baseline cost divided by tracker cost after each turn.
    pub ratios: Vec<f64>,
}

impl PolicyComparison {
    /// Returns the final baseline/tracker cost ratio.
    pub fn final_ratio(&self) -> f64 {
        ratio(self.baseline_cost, self.tracker_cost)
    }
}

/// Replays `token_lengths` under a [`RatioTracker`] with threshold `pi` and
/// under a plain [`CacheSession`] that never writes.
pub fn compare_with_baseline(pi: f64, token_lengths: &[u64]) -> PolicyComparison {
    let mut tracker = RatioTracker::new(pi);
    let mut baseline = CacheSession::new();

    let ratios = token_lengths
        .iter()
        .map(|&tokens| {
            tracker.infer(tokens);
            baseline.infer(tokens);
            ratio(baseline.cost(), tracker.cost())
        })
        .collect();

    PolicyComparison {
        pi,
        tracker_cost: tracker.cost(),
        baseline_cost: baseline.cost(),
        ratios,
    }
}

/// Draws `iterations` turn lengths uniformly from `min_tokens..=max_tokens`.
///
/// # Errors
///
/// Returns [`PolicyError::InvalidTokenRange`] if the range is empty or
/// `min_tokens` is zero.
pub fn random_workload<R: Rng + ?Sized>(
    rng: &mut R,
    iterations: usize,
    min_tokens: u64,
    max_tokens: u64,
) -> Result<Vec<u64>, PolicyError> {
    if min_tokens == 0 || min_tokens > max_tokens {
        return Err(PolicyError::InvalidTokenRange {
            min: min_tokens,
            max: max_tokens,
        });
    }
    Ok((0..iterations)
        .map(|_| rng.random_range(min_tokens..=max_tokens))
        .collect())
}

/// Same as [`random_workload`] with a reproducible generator.
pub fn seeded_workload(
    seed: u64,
    iterations: usize,
    min_tokens: u64,
    max_tokens: u64,
) -> Result<Vec<u64>, PolicyError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_workload(&mut rng, iterations, min_tokens, max_tokens)
}

// Equal (including both zero) costs compare as 1.
fn ratio(baseline: f64, tracker: f64) -> f64 {
    if tracker == baseline {
        1.0
    } else {
        baseline / tracker
    }
}
