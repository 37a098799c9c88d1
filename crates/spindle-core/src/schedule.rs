//! Time schedules for event generators and samplers

use crate::error::{CoreError, Result};
use crate::time::Time;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A finite, sorted sequence of times queryable on any half-open interval.
///
/// Interval queries are pure: asking for `[a, b)` twice yields the same
/// times, so schedules are restartable by construction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Schedule {
    /// Times at a fixed cadence: `first`, `first + interval`, ...
    Regular {
        /// First scheduled time
        first: Time,
        /// Cadence between consecutive times, strictly positive
        interval: Time,
    },
    /// An explicit, sorted list of times
    Explicit {
        /// Scheduled times, ascending
        times: Vec<Time>,
    },
}

impl Schedule {
    /// Create a regular schedule starting at time zero
    pub fn regular(interval: Time) -> Result<Self> {
        Self::regular_from(Time::ZERO, interval)
    }

    /// Create a regular schedule with an explicit first time
    pub fn regular_from(first: Time, interval: Time) -> Result<Self> {
        if interval == Time::ZERO {
            return Err(CoreError::invalid_schedule(
                "regular schedule interval must be positive",
            ));
        }
        Ok(Self::Regular { first, interval })
    }

    /// Create an explicit schedule; the times are sorted on construction
    pub fn explicit(mut times: Vec<Time>) -> Self {
        times.sort_unstable();
        Self::Explicit { times }
    }

    /// The scheduled times falling in `[t0, t1)`, ascending
    pub fn events(&self, t0: Time, t1: Time) -> Vec<Time> {
        match self {
            Schedule::Regular { first, interval } => {
                let mut times = Vec::new();
                if t1 <= *first {
                    return times;
                }
                let step = interval.as_nanos();
                let mut tick = if t0 <= *first {
                    0
                } else {
                    // First cadence index at or after t0.
                    (t0.as_nanos() - first.as_nanos() + step - 1) / step
                };
                loop {
                    let t = Time::from_nanos(first.as_nanos() + tick * step);
                    if t >= t1 {
                        break;
                    }
                    times.push(t);
                    tick += 1;
                }
                times
            }
            Schedule::Explicit { times } => {
                let lower = times.partition_point(|&t| t < t0);
                let upper = times.partition_point(|&t| t < t1);
                times[lower..upper].to_vec()
            }
        }
    }

    /// Restart the schedule. Interval queries are pure, so this is a no-op
    /// kept for symmetry with the generator contract.
    pub fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Time {
        Time::from_millis(v)
    }

    #[test]
    fn test_regular_rejects_zero_interval() {
        assert!(Schedule::regular(Time::ZERO).is_err());
    }

    #[test]
    fn test_regular_interval_query() {
        let sched = Schedule::regular_from(ms(1), ms(1)).unwrap();
        assert_eq!(sched.events(ms(0), ms(4)), vec![ms(1), ms(2), ms(3)]);
        assert_eq!(sched.events(ms(2), ms(3)), vec![ms(2)]);
        assert_eq!(sched.events(ms(0), ms(1)), Vec::<Time>::new());
        // Interval ends are exclusive.
        assert_eq!(sched.events(ms(3), ms(3)), Vec::<Time>::new());
    }

    #[test]
    fn test_regular_is_restartable() {
        let sched = Schedule::regular(ms(2)).unwrap();
        let first = sched.events(ms(0), ms(10));
        let again = sched.events(ms(0), ms(10));
        assert_eq!(first, again);
        assert_eq!(first, vec![ms(0), ms(2), ms(4), ms(6), ms(8)]);
    }

    #[test]
    fn test_explicit_sorts_and_slices() {
        let sched = Schedule::explicit(vec![ms(5), ms(1), ms(3)]);
        assert_eq!(sched.events(ms(1), ms(5)), vec![ms(1), ms(3)]);
        assert_eq!(sched.events(ms(0), ms(10)), vec![ms(1), ms(3), ms(5)]);
        assert_eq!(sched.events(ms(6), ms(10)), Vec::<Time>::new());
    }
}
