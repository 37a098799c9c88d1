//! Single-process spike transport
//!
//! A [`Communicator`] for simulations that live entirely on one rank: the
//! "collective" exchange is a sort of the local spikes, and translation walks
//! a static connection table. Distributed deployments swap in a transport
//! backed by a real collective; the driver cannot tell the difference.

use crate::error::{Result, SimulationError};
use spindle_core::{CoreError, Communicator, Event, Gid, Spike, Time};
use std::collections::HashMap;
use std::ops::Range;

/// A point-to-point connection in the network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Presynaptic cell
    pub source: Gid,
    /// Postsynaptic cell
    pub target: Gid,
    /// Synapse target index on the postsynaptic cell
    pub target_index: u32,
    /// Axonal plus synaptic delay
    pub delay: Time,
    /// Synaptic weight
    pub weight: f32,
}

impl Connection {
    /// Create a connection onto target index 0
    pub fn new(source: Gid, target: Gid, delay: Time, weight: f32) -> Self {
        Self {
            source,
            target,
            target_index: 0,
            delay,
            weight,
        }
    }
}

/// In-process implementation of the spike transport contract.
pub struct LoopbackCommunicator {
    gid_to_cell: HashMap<Gid, usize>,
    group_ranges: Vec<Range<usize>>,
    num_cells: usize,
    min_delay: Time,
    connections: HashMap<Gid, Vec<Connection>>,
    num_spikes: usize,
}

impl LoopbackCommunicator {
    /// Create a transport for the given cell groups.
    ///
    /// `groups` lists the gids of each cell group in local order; their
    /// concatenation defines the local cell indexing. `min_delay` is the
    /// floor every connection delay must respect.
    pub fn new(groups: &[Vec<Gid>], min_delay: Time) -> Result<Self> {
        if min_delay == Time::ZERO {
            return Err(SimulationError::invalid_config(
                "minimum network delay must be positive",
            ));
        }

        let mut gid_to_cell = HashMap::new();
        let mut group_ranges = Vec::with_capacity(groups.len());
        let mut next_cell = 0usize;
        for gids in groups {
            let start = next_cell;
            for gid in gids {
                if gid_to_cell.insert(*gid, next_cell).is_some() {
                    return Err(SimulationError::invalid_config(format!(
                        "cell {} appears in more than one group",
                        gid
                    )));
                }
                next_cell += 1;
            }
            group_ranges.push(start..next_cell);
        }

        Ok(Self {
            gid_to_cell,
            group_ranges,
            num_cells: next_cell,
            min_delay,
            connections: HashMap::new(),
            num_spikes: 0,
        })
    }

    /// Add a connection; its delay must not undercut the minimum delay
    pub fn connect(&mut self, connection: Connection) -> Result<()> {
        if connection.delay < self.min_delay {
            return Err(SimulationError::invalid_config(format!(
                "connection delay {} undercuts the minimum network delay {}",
                connection.delay, self.min_delay
            )));
        }
        self.connections
            .entry(connection.source)
            .or_default()
            .push(connection);
        Ok(())
    }
}

impl Communicator for LoopbackCommunicator {
    fn num_local_cells(&self) -> usize {
        self.num_cells
    }

    fn min_delay(&self) -> Time {
        self.min_delay
    }

    fn group_queue_range(&self, group_index: usize) -> Range<usize> {
        self.group_ranges
            .get(group_index)
            .cloned()
            .unwrap_or(self.num_cells..self.num_cells)
    }

    fn exchange(&mut self, local: &[Spike]) -> spindle_core::Result<Vec<Spike>> {
        self.num_spikes += local.len();
        let mut global = local.to_vec();
        global.sort_unstable_by_key(|spike| (spike.time, spike.source));
        Ok(global)
    }

    fn make_event_queues(&mut self, global: &[Spike], pending: &mut [Vec<Event>]) {
        for spike in global {
            let Some(connections) = self.connections.get(&spike.source) else {
                continue;
            };
            for connection in connections {
                if let Some(&cell) = self.gid_to_cell.get(&connection.target) {
                    pending[cell].push(Event::new(
                        spike.time + connection.delay,
                        connection.target_index,
                        connection.weight,
                    ));
                }
            }
        }
    }

    fn num_spikes(&self) -> usize {
        self.num_spikes
    }

    fn reset(&mut self) {
        self.num_spikes = 0;
    }
}

/// A transport whose collective always fails; used to exercise the abort
/// path of the scheduler.
pub struct FailingCommunicator {
    inner: LoopbackCommunicator,
}

impl FailingCommunicator {
    /// Wrap a loopback transport so every exchange fails
    pub fn new(inner: LoopbackCommunicator) -> Self {
        Self { inner }
    }
}

impl Communicator for FailingCommunicator {
    fn num_local_cells(&self) -> usize {
        self.inner.num_local_cells()
    }

    fn min_delay(&self) -> Time {
        self.inner.min_delay()
    }

    fn group_queue_range(&self, group_index: usize) -> Range<usize> {
        self.inner.group_queue_range(group_index)
    }

    fn exchange(&mut self, _local: &[Spike]) -> spindle_core::Result<Vec<Spike>> {
        Err(CoreError::exchange("collective unavailable"))
    }

    fn make_event_queues(&mut self, global: &[Spike], pending: &mut [Vec<Event>]) {
        self.inner.make_event_queues(global, pending);
    }

    fn num_spikes(&self) -> usize {
        self.inner.num_spikes()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
