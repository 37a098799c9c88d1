//! Simulation time representation
//!
//! Time is kept in integer nanoseconds so that event ordering is total and
//! bit-identical across ranks, while still covering biological time scales.

use core::fmt;
use core::ops::{Add, AddAssign, Div, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Simulation time in nanoseconds.
///
/// The same representation is used for absolute times and for durations
/// (timesteps, synaptic delays, epoch intervals); the scheduler treats them
/// interchangeably.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Time(u64);

impl Time {
    /// Zero time constant
    pub const ZERO: Self = Self(0);

    /// Maximum representable time
    pub const MAX: Self = Self(u64::MAX);

    /// Create a time from nanoseconds
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Create a time from microseconds
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros * 1_000)
    }

    /// Create a time from milliseconds
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000_000)
    }

    /// Create a time from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000_000_000)
    }

    /// Get the time as nanoseconds
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Get the time as whole milliseconds, truncating
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Get the time as fractional milliseconds, for reporting
    pub fn as_millis_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Saturating addition
    pub const fn saturating_add(self, other: Time) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Checked subtraction, `None` when `other` is later than `self`
    pub const fn checked_sub(self, other: Time) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(nanos) => Some(Self(nanos)),
            None => None,
        }
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, other: Time) -> Time {
        Time(self.0 + other.0)
    }
}

impl AddAssign for Time {
    fn add_assign(&mut self, other: Time) {
        self.0 += other.0;
    }
}

impl Sub for Time {
    type Output = Time;

    fn sub(self, other: Time) -> Time {
        Time(self.0 - other.0)
    }
}

impl Div<u64> for Time {
    type Output = Time;

    fn div(self, divisor: u64) -> Time {
        Time(self.0 / divisor)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Time::from_millis(2).as_nanos(), 2_000_000);
        assert_eq!(Time::from_micros(100).as_nanos(), 100_000);
        assert_eq!(Time::from_secs(1).as_millis(), 1_000);
        assert_eq!(Time::from_millis(3).as_millis_f64(), 3.0);
    }

    #[test]
    fn test_arithmetic() {
        let t = Time::from_millis(2) + Time::from_millis(1);
        assert_eq!(t, Time::from_millis(3));
        assert_eq!(Time::from_millis(2) / 2, Time::from_millis(1));
        assert_eq!(Time::from_millis(2) - Time::from_millis(2), Time::ZERO);
        assert_eq!(Time::from_millis(1).checked_sub(Time::from_millis(2)), None);
        assert_eq!(Time::MAX.saturating_add(Time::from_nanos(1)), Time::MAX);
    }

    #[test]
    fn test_ordering_is_total() {
        let mut times = vec![Time::from_millis(3), Time::ZERO, Time::from_micros(1)];
        times.sort();
        assert_eq!(
            times,
            vec![Time::ZERO, Time::from_micros(1), Time::from_millis(3)]
        );
    }
}
