//! Token pricing model.
//!
//! Every processed token is charged at the uncached rate unless it is covered
//! by the most recent cache write, in which case it is charged at the cached
//! rate. Writing the cache costs a one-time fee proportional to everything
//! accumulated so far.
//!
//! Prices are in monetary units per million tokens and are fixed: they are the
//! pricing contract the search optimizes against.

/// Price per million tokens not covered by the cache.
pub const UNCACHED_TOKEN_PRICE: f64 = 3.0;

/// Price per million tokens served from the cache.
pub const CACHED_TOKEN_PRICE: f64 = 0.3;

/// Price per million tokens written to the cache.
pub const CACHE_WRITE_PRICE: f64 = 3.75;

/// Token count the prices are quoted per.
pub const PRICE_DIVISOR: f64 = 1_000_000.0;

/// Running cost accumulator for one token stream.
///
/// # Examples
///
/// ```
/// use cachesplit_core::CacheSession;
///
/// let mut session = CacheSession::new();
/// session.infer(1);
/// session.make_cache();
/// session.infer(1);
///
/// assert_eq!(session.token_count(), 2);
/// assert_eq!(session.cached_tokens(), 1);
/// assert!(session.cost() > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheSession {
    cached_tokens: u64,
    token_count: u64,
    cost: f64,
}

impl CacheSession {
    /// Creates a session with nothing processed and nothing cached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes `tokens` new tokens and charges for the whole context.
    ///
    /// The batch shares one charge: the context after the batch is priced
    /// once, split between cached and uncached tokens.
    pub fn infer(&mut self, tokens: u64) {
        self.token_count += tokens;
        let non_cached = self.token_count - self.cached_tokens;
        self.cost += (UNCACHED_TOKEN_PRICE * non_cached as f64
            + CACHED_TOKEN_PRICE * self.cached_tokens as f64)
            / PRICE_DIVISOR;
    }

    /// Writes the whole current context to the cache.
    pub fn make_cache(&mut self) {
        self.cached_tokens = self.token_count;
        self.cost += CACHE_WRITE_PRICE * self.cached_tokens as f64 / PRICE_DIVISOR;
    }

    /// Returns the number of tokens covered by the latest cache write.
    #[inline]
    pub fn cached_tokens(&self) -> u64 {
        self.cached_tokens
    }

    /// Returns the number of tokens processed so far.
    #[inline]
    pub fn token_count(&self) -> u64 {
        self.token_count
    }

    /// Returns the cost accumulated so far.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }
}

/// Returns the cost of a stream of `sequence_length` single-token steps with
/// cache writes at the given positions.
///
/// `assignment` must be sorted. Positions outside `0..sequence_length` never
/// match and are ignored.
///
/// # Examples
///
/// ```
/// use cachesplit_core::simulate;
///
/// let no_cache = simulate(&[], 4);
/// let early_cache = simulate(&[0], 4);
///
/// assert!(early_cache < no_cache);
/// ```
pub fn simulate(assignment: &[usize], sequence_length: usize) -> f64 {
    let mut session = CacheSession::new();
    for position in 0..sequence_length {
        step(&mut session, assignment, position);
    }
    session.cost()
}

/// Returns the running cost after each position of the stream.
///
/// The last element equals [`simulate`] for the same arguments.
pub fn cost_trace(assignment: &[usize], sequence_length: usize) -> Vec<f64> {
    let mut session = CacheSession::new();
    (0..sequence_length)
        .map(|position| {
            step(&mut session, assignment, position);
            session.cost()
        })
        .collect()
}

/// Cost of processing a `sequence_length` context once, fully uncached,
/// at one token per step: 3 * L^2 / 2e6.
pub fn reference_cost(sequence_length: usize) -> f64 {
    let length = sequence_length as f64;
    UNCACHED_TOKEN_PRICE * length.powi(2) / (2.0 * PRICE_DIVISOR)
}

#[inline]
fn step(session: &mut CacheSession, assignment: &[usize], position: usize) {
    session.infer(1);
    if assignment.binary_search(&position).is_ok() {
        session.make_cache();
    }
}
