//! The communicator contract
//!
//! The communicator owns the connectivity view of the network and the
//! cross-rank collective. The driver never inspects connectivity itself: it
//! hands local spikes in and gets postsynaptic events out.

use crate::error::Result;
use crate::event::Event;
use crate::spike::Spike;
use crate::time::Time;
use std::ops::Range;

/// Contract between the epoch scheduler and the spike transport.
///
/// `exchange` is a blocking collective: every rank must call it once per
/// epoch, in epoch order. All other operations are rank-local.
pub trait Communicator: Send {
    /// Number of cells owned by this rank
    fn num_local_cells(&self) -> usize;

    /// Minimum synaptic delay across the whole network; the scheduler derives
    /// its epoch length from this
    fn min_delay(&self) -> Time;

    /// The contiguous slice of the per-cell event lane vector belonging to
    /// the given cell group
    fn group_queue_range(&self, group_index: usize) -> Range<usize>;

    /// Collate `local` spikes across all ranks and return the globally
    /// ordered spike set
    fn exchange(&mut self, local: &[Spike]) -> Result<Vec<Spike>>;

    /// Translate global spikes into postsynaptic events, appending each to
    /// the pending buffer of its target cell
    fn make_event_queues(&mut self, global: &[Spike], pending: &mut [Vec<Event>]);

    /// Total number of spikes exchanged since construction or the last reset
    fn num_spikes(&self) -> usize;

    /// Clear exchange state and counters
    fn reset(&mut self);
}
