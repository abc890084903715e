//! Core types and cost model for cache boundary placement.
//!
//! This crate provides:
//! - The token pricing model ([`CacheSession`], [`simulate`])
//! - Split assignments and the best-so-far record ([`BestResult`])
//! - The online ratio-tracker caching policy ([`policy`])
//! - Error types shared by the solver crates

pub mod assignment;
pub mod cost;
pub mod error;
pub mod policy;

pub use assignment::{is_valid_assignment, BestResult, SplitAssignment};
pub use cost::{
    cost_trace, reference_cost, simulate, CacheSession, CACHED_TOKEN_PRICE, CACHE_WRITE_PRICE,
    PRICE_DIVISOR, UNCACHED_TOKEN_PRICE,
};
pub use error::{PolicyError, Result, SearchError};
pub use policy::{compare_with_baseline, PolicyComparison, RatioTracker};
