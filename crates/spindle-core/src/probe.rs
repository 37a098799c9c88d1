//! Probe addressing and metadata

use crate::spike::Gid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Address of a probe: a cell plus a per-cell probe index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProbeId {
    /// The cell carrying the probe
    pub gid: Gid,
    /// Probe index on that cell
    pub index: u32,
}

impl ProbeId {
    /// Create a probe address
    pub const fn new(gid: Gid, index: u32) -> Self {
        Self { gid, index }
    }
}

/// Metadata describing one sampled location of a probe
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProbeMetadata {
    /// The probe this metadata describes
    pub id: ProbeId,
    /// What the probe observes, e.g. `"membrane-voltage"`
    pub tag: String,
    /// Location index for probes observing multiple sites
    pub index: u32,
}
