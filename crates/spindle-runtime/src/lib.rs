//! Epoch-pipelined simulation driver for distributed spiking networks
//!
//! This crate drives a population of cell groups through integration epochs
//! of at most half the minimum network delay, overlapping local integration
//! with cross-rank spike exchange and per-cell event enqueue. Cell-group
//! integrators and the spike transport are collaborators behind the
//! [`spindle_core`] contracts; everything here is about scheduling,
//! buffering, and merging.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export the vocabulary types collaborators are written against.
pub use spindle_core::{
    event_order, BinningKind, CellGroup, Communicator, CoreError, Epoch, Event, EventGenerator,
    EventLane, Gid, ProbeId, ProbeMetadata, ProbePredicate, Sample, SamplerAssociation, SamplerFn,
    SamplerHandle, SamplingPolicy, Schedule, Spike, Time,
};

pub mod error;
pub mod handles;
pub mod loopback;
pub mod merge;
pub mod simulation;
pub mod spike_store;
pub mod threading;

pub use error::{Result, SimulationError};
pub use handles::HandleSet;
pub use loopback::{Connection, FailingCommunicator, LoopbackCommunicator};
pub use merge::{merge_cell_events, tree_merge_events};
pub use simulation::{Simulation, SimulationBuilder, SpikeCallback};
pub use spike_store::SpikeStore;
pub use threading::TaskPool;

/// Runtime crate version for compatibility checking
pub const RUNTIME_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        // The essential pieces assemble without a full simulation.
        let pool = TaskPool::new(1).unwrap();
        assert!(pool.num_threads() >= 1);

        let sched = Schedule::regular(Time::from_millis(1)).unwrap();
        let mut generator = EventGenerator::new(0, 1.0, sched);
        assert_eq!(generator.events(Time::ZERO, Time::from_millis(2)).len(), 2);

        let mut handles = HandleSet::new();
        assert_eq!(handles.acquire().raw(), 0);
    }
}
