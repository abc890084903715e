//! Split assignments and best-so-far tracking.

/// Strictly increasing cache write positions within `0..sequence_length`.
pub type SplitAssignment = Vec<usize>;

/// Returns whether `assignment` is strictly increasing and every position is
/// below `sequence_length`.
///
/// # Examples
///
/// ```
/// use cachesplit_core::is_valid_assignment;
///
/// assert!(is_valid_assignment(&[0, 3, 4], 5));
/// assert!(!is_valid_assignment(&[3, 3], 5));
/// assert!(!is_valid_assignment(&[5], 5));
/// ```
pub fn is_valid_assignment(assignment: &[usize], sequence_length: usize) -> bool {
    let increasing = assignment.windows(2).all(|pair| pair[0] < pair[1]);
    let in_range = assignment.last().map_or(true, |&last| last < sequence_length);
    increasing && in_range
}

/// The cheapest complete assignment seen so far.
///
/// Only strict improvements replace the record, so among equal-cost
/// assignments the first one offered is kept.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BestResult {
    /// Modeled cost of `assignment`, or infinity when nothing feasible exists.
    pub cost: f64,
    /// The cache write positions.
    pub assignment: SplitAssignment,
}

impl BestResult {
    /// Creates a record for a known assignment.
    pub fn new(cost: f64, assignment: SplitAssignment) -> Self {
        Self { cost, assignment }
    }

    /// Returns the "no feasible assignment" record.
    ///
    /// Its cost is infinite, so any finite candidate improves on it.
    pub fn infeasible() -> Self {
        Self {
            cost: f64::INFINITY,
            assignment: Vec::new(),
        }
    }

    /// Returns whether this record holds an actual assignment.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.cost.is_finite()
    }

    /// Returns whether `cost` would replace this record.
    #[inline]
    pub fn is_improved_by(&self, cost: f64) -> bool {
        cost < self.cost
    }

    /// Replaces the record if `cost` is strictly lower.
    ///
    /// The assignment is only materialized when it is kept.
    pub fn offer(&mut self, cost: f64, assignment: &[usize]) -> bool {
        if self.is_improved_by(cost) {
            self.cost = cost;
            self.assignment.clear();
            self.assignment.extend_from_slice(assignment);
            true
        } else {
            false
        }
    }

    /// Keeps the strictly cheaper of `self` and `other`.
    pub fn merge(&mut self, other: BestResult) {
        if self.is_improved_by(other.cost) {
            *self = other;
        }
    }
}

impl Default for BestResult {
    fn default() -> Self {
        Self::infeasible()
    }
}
