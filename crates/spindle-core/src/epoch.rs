//! Integration epochs
//!
//! An epoch is a half-open interval `[t0, t1)` carrying a monotonically
//! increasing id. The id's parity selects the side of every double-buffered
//! store, which is what makes the two-epoch pipeline expressible without
//! copying.

use crate::time::Time;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A half-min-delay integration interval `[t0, t1)` with an id.
///
/// A freshly constructed epoch is zero-width with id `-1`; the first
/// [`advance_to`](Epoch::advance_to) produces epoch 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Epoch {
    /// Epoch id, monotonically increasing
    pub id: i64,
    /// Inclusive interval start
    pub t0: Time,
    /// Exclusive interval end
    pub t1: Time,
}

impl Default for Epoch {
    fn default() -> Self {
        Self {
            id: -1,
            t0: Time::ZERO,
            t1: Time::ZERO,
        }
    }
}

impl Epoch {
    /// Create an epoch spanning `[t0, t1)` with the given id
    pub const fn new(id: i64, t0: Time, t1: Time) -> Self {
        Self { id, t0, t1 }
    }

    /// Whether the epoch covers no time at all
    pub fn is_empty(&self) -> bool {
        self.t0 == self.t1
    }

    /// Shift to the following interval: `t0` becomes the old `t1`, `t1`
    /// becomes `next_t1`, and the id increments.
    pub fn advance_to(&mut self, next_t1: Time) {
        self.t0 = self.t1;
        self.t1 = next_t1;
        self.id += 1;
    }

    /// Index of this epoch's side in a double-buffered store
    pub fn lane_index(&self) -> usize {
        (self.id & 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero_width() {
        let epoch = Epoch::default();
        assert!(epoch.is_empty());
        assert_eq!(epoch.id, -1);
        assert_eq!(epoch.t1, Time::ZERO);
    }

    #[test]
    fn test_advance_chains_intervals() {
        let mut epoch = Epoch::default();
        epoch.advance_to(Time::from_millis(1));
        assert_eq!(epoch.id, 0);
        assert_eq!(epoch.t0, Time::ZERO);
        assert_eq!(epoch.t1, Time::from_millis(1));

        epoch.advance_to(Time::from_millis(2));
        assert_eq!(epoch.id, 1);
        assert_eq!(epoch.t0, Time::from_millis(1));
        assert!(!epoch.is_empty());

        // Advancing to the same end produces an empty epoch, the loop
        // termination condition in the scheduler.
        epoch.advance_to(Time::from_millis(2));
        assert!(epoch.is_empty());
    }

    #[test]
    fn test_lane_parity_alternates() {
        let mut epoch = Epoch::default();
        assert_eq!(epoch.lane_index(), 1);
        epoch.advance_to(Time::from_millis(1));
        assert_eq!(epoch.lane_index(), 0);
        epoch.advance_to(Time::from_millis(2));
        assert_eq!(epoch.lane_index(), 1);
    }
}
