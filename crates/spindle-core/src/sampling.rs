//! Sampler registration types
//!
//! Samplers observe probes on a schedule. The driver hands each cell group a
//! copy of the association; callbacks are owned values, never back-references
//! into the driver.

use crate::probe::{ProbeId, ProbeMetadata};
use crate::schedule::Schedule;
use crate::time::Time;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque handle identifying a live sampler association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplerHandle(u32);

impl SamplerHandle {
    /// Create a handle from its raw value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw handle value
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

/// How strictly sample times must align with integration times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SamplingPolicy {
    /// Sample at the nearest convenient integration time
    Lax,
    /// Sample at exactly the scheduled times
    Exact,
}

/// Event-time binning applied by a cell group before delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinningKind {
    /// Deliver events at their exact times
    None,
    /// Round event times down to a fixed grid
    Regular,
    /// Bin events following the cell's last spike
    Following,
}

/// One sampled value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Time the sample was taken
    pub time: Time,
    /// Sampled value
    pub value: f64,
}

/// Predicate selecting the probes a sampler observes
pub type ProbePredicate = Arc<dyn Fn(ProbeId) -> bool + Send + Sync>;

/// Callback receiving samples for one probe
pub type SamplerFn = Arc<dyn Fn(&ProbeMetadata, &[Sample]) + Send + Sync>;

/// A sampler registration, copied to every cell group
#[derive(Clone)]
pub struct SamplerAssociation {
    /// Handle identifying this association
    pub handle: SamplerHandle,
    /// Which probes to observe
    pub probes: ProbePredicate,
    /// When to sample
    pub schedule: Schedule,
    /// Where samples are delivered
    pub sampler: SamplerFn,
    /// Alignment policy for sample times
    pub policy: SamplingPolicy,
}
