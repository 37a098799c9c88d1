//! Spikes and global cell identifiers

use crate::time::Time;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Global identifier of a cell, unique across all ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gid(pub u64);

impl Gid {
    /// Create a new global cell identifier
    pub const fn new(gid: u64) -> Self {
        Self(gid)
    }

    /// Get the raw identifier value
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Gid {
    fn from(gid: u64) -> Self {
        Self(gid)
    }
}

/// A spike emitted by a cell during an integration epoch.
///
/// Spikes are rank-local until the exchange step collates them; translation
/// into postsynaptic [`Event`](crate::Event)s happens on the receiving side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spike {
    /// The cell that emitted the spike
    pub source: Gid,
    /// Emission time
    pub time: Time,
}

impl Spike {
    /// Create a new spike
    pub const fn new(source: Gid, time: Time) -> Self {
        Self { source, time }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gid_roundtrip() {
        let gid = Gid::new(42);
        assert_eq!(gid.raw(), 42);
        assert_eq!(Gid::from(42u64), gid);
        assert_eq!(format!("{}", gid), "42");
    }

    #[test]
    fn test_spike_sort_key() {
        let mut spikes = vec![
            Spike::new(Gid::new(1), Time::from_millis(2)),
            Spike::new(Gid::new(0), Time::from_millis(2)),
            Spike::new(Gid::new(9), Time::from_millis(1)),
        ];
        spikes.sort_unstable_by_key(|s| (s.time, s.source));
        assert_eq!(spikes[0].source, Gid::new(9));
        assert_eq!(spikes[1].source, Gid::new(0));
        assert_eq!(spikes[2].source, Gid::new(1));
    }
}
