//! Search statistics.
//!
//! Plain counters owned by one explorer; workers merge theirs after the
//! parallel region ends.

/// Counters for one exploration, one worker, or one split count.
///
/// # Example
///
/// ```
/// use cachesplit_solver::SearchStats;
///
/// let mut a = SearchStats::default();
/// a.children_pushed = 3;
/// a.children_pruned = 1;
///
/// let mut b = SearchStats::default();
/// b.children_pruned = 4;
///
/// a.merge(&b);
/// assert_eq!(a.children_pruned, 5);
/// assert!((a.prune_rate() - 0.625).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// First-split units explored.
    pub units: u64,
    /// Frames taken off the work stack.
    pub frames_popped: u64,
    /// Child frames pushed.
    pub children_pushed: u64,
    /// Children discarded by the bound.
    pub children_pruned: u64,
    /// Complete assignments simulated.
    pub leaves_evaluated: u64,
    /// Strict improvements of the running best.
    pub improvements: u64,
}

impl SearchStats {
    /// Adds `other` into `self`.
    pub fn merge(&mut self, other: &SearchStats) {
        self.units += other.units;
        self.frames_popped += other.frames_popped;
        self.children_pushed += other.children_pushed;
        self.children_pruned += other.children_pruned;
        self.leaves_evaluated += other.leaves_evaluated;
        self.improvements += other.improvements;
    }

    /// Returns pruned / (pushed + pruned).
    pub fn prune_rate(&self) -> f64 {
        let generated = self.children_pushed + self.children_pruned;
        if generated == 0 {
            0.0
        } else {
            self.children_pruned as f64 / generated as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_rate_empty() {
        assert_eq!(SearchStats::default().prune_rate(), 0.0);
    }

    #[test]
    fn test_merge_all_fields() {
        let one = SearchStats {
            units: 1,
            frames_popped: 2,
            children_pushed: 3,
            children_pruned: 4,
            leaves_evaluated: 5,
            improvements: 6,
        };
        let mut total = one;
        total.merge(&one);
        assert_eq!(total.units, 2);
        assert_eq!(total.frames_popped, 4);
        assert_eq!(total.children_pushed, 6);
        assert_eq!(total.children_pruned, 8);
        assert_eq!(total.leaves_evaluated, 10);
        assert_eq!(total.improvements, 12);
    }
}
