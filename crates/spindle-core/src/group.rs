//! The cell group contract
//!
//! A cell group is a set of cells advanced together by one integration
//! backend. The driver treats groups as black boxes behind this trait; the
//! concrete integrators live outside the core.

use crate::error::Result;
use crate::epoch::Epoch;
use crate::event::EventLane;
use crate::probe::{ProbeId, ProbeMetadata};
use crate::sampling::{BinningKind, SamplerAssociation, SamplerHandle};
use crate::spike::Spike;
use crate::time::Time;

/// Contract between the epoch scheduler and an integration backend.
///
/// `advance` is called at most once per epoch, with the group's slice of the
/// current event lanes. Emitted spikes accumulate in the group until the
/// scheduler drains them with `spikes` / `clear_spikes` in the same task.
pub trait CellGroup: Send {
    /// Integrate all cells to `epoch.t1` with timestep `dt`, consuming the
    /// events in `lanes` (one lane per owned cell, in local cell order).
    /// Lane entries with `time >= epoch.t1` belong to later epochs and must
    /// be left for the carry-over merge.
    fn advance(&mut self, epoch: Epoch, dt: Time, lanes: &[EventLane]) -> Result<()>;

    /// Spikes emitted since the last `clear_spikes`
    fn spikes(&self) -> &[Spike];

    /// Discard the accumulated spikes
    fn clear_spikes(&mut self);

    /// Return every cell to its initial state
    fn reset(&mut self);

    /// Register a sampler association with this group
    fn add_sampler(&mut self, association: SamplerAssociation);

    /// Remove the sampler association with the given handle, if present
    fn remove_sampler(&mut self, handle: SamplerHandle);

    /// Remove every sampler association
    fn remove_all_samplers(&mut self);

    /// Set the event-time binning policy for all cells in the group
    fn set_binning_policy(&mut self, kind: BinningKind, interval: Time);

    /// Metadata for the given probe; empty if the probe is not in this group
    fn probe_metadata(&self, probe: ProbeId) -> Vec<ProbeMetadata>;
}
