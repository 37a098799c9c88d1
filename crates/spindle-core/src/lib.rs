//! Base types and contracts for the spindle simulation driver
//!
//! This crate defines the vocabulary shared between the epoch-pipelined
//! driver and its external collaborators: times, spikes, postsynaptic
//! events, epochs, schedules, event generators, sampling types, and the
//! [`CellGroup`] and [`Communicator`] traits at the seams.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod comm;
pub mod epoch;
pub mod error;
pub mod event;
pub mod generator;
pub mod group;
pub mod probe;
pub mod sampling;
pub mod schedule;
pub mod spike;
pub mod time;

pub use comm::Communicator;
pub use epoch::Epoch;
pub use error::{CoreError, Result};
pub use event::{event_order, Event, EventLane};
pub use generator::EventGenerator;
pub use group::CellGroup;
pub use probe::{ProbeId, ProbeMetadata};
pub use sampling::{
    BinningKind, ProbePredicate, Sample, SamplerAssociation, SamplerFn, SamplerHandle,
    SamplingPolicy,
};
pub use schedule::Schedule;
pub use spike::{Gid, Spike};
pub use time::Time;

/// Core crate version for compatibility checking
pub const CORE_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let mut epoch = Epoch::default();
        epoch.advance_to(Time::from_millis(1));

        let sched = Schedule::regular(Time::from_millis(1)).unwrap();
        let mut generator = EventGenerator::new(0, 1.0, sched);
        let events = generator.events(epoch.t0, epoch.t1);
        assert_eq!(events.len(), 1);
        assert!(events[0].time < epoch.t1);
    }
}
