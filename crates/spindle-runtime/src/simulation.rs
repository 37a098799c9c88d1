//! The epoch-pipelined simulation driver
//!
//! `run` advances the simulation through integration epochs of at most half
//! the minimum network delay. Three tasks cooperate per epoch — Update,
//! Exchange, Enqueue — over double-buffered spike stores and event lanes,
//! overlapping local integration with communication while keeping event
//! delivery deterministic.

use crate::error::{Result, SimulationError};
use crate::handles::HandleSet;
use crate::merge::merge_cell_events;
use crate::spike_store::SpikeStore;
use crate::threading::TaskPool;
use spindle_core::{
    event_order, BinningKind, CellGroup, Communicator, Epoch, Event, EventGenerator, EventLane,
    Gid, ProbeId, ProbeMetadata, ProbePredicate, SamplerAssociation, SamplerFn, SamplerHandle,
    SamplingPolicy, Schedule, Spike, Time,
};
use std::cmp;
use std::collections::HashMap;
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Callback receiving the spikes of one epoch, either the local ones or the
/// globally collated set
pub type SpikeCallback = Box<dyn FnMut(&[Spike]) + Send>;

/// Local coordinates of a cell with a given gid
#[derive(Debug, Clone, Copy)]
struct GidLocalInfo {
    cell_index: u32,
    group_index: u32,
}

/// Assembles a [`Simulation`] from cell groups, generators, and a transport.
///
/// Groups are added in local order; the concatenation of their gid lists
/// defines the local cell indexing, which must agree with the communicator's
/// `group_queue_range` partition.
#[derive(Default)]
pub struct SimulationBuilder {
    groups: Vec<(Box<dyn CellGroup>, Vec<Gid>)>,
    generators: Vec<(Gid, EventGenerator)>,
    num_threads: usize,
}

impl SimulationBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell group owning the given gids, in local cell order
    pub fn add_group(mut self, group: impl CellGroup + 'static, gids: Vec<Gid>) -> Self {
        self.groups.push((Box::new(group), gids));
        self
    }

    /// Attach an event generator to the cell with the given gid
    pub fn add_generator(mut self, gid: Gid, generator: EventGenerator) -> Self {
        self.generators.push((gid, generator));
        self
    }

    /// Set the worker thread count; `0` picks one per logical core
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Validate the configuration and build the simulation
    pub fn build(self, communicator: Box<dyn Communicator>) -> Result<Simulation> {
        let pool = TaskPool::new(self.num_threads)?;

        let num_cells = communicator.num_local_cells();
        let supplied: usize = self.groups.iter().map(|(_, gids)| gids.len()).sum();
        if supplied != num_cells {
            return Err(SimulationError::invalid_config(format!(
                "groups supply {} cells but the communicator owns {}",
                supplied, num_cells
            )));
        }

        let min_delay = communicator.min_delay();
        let t_interval = min_delay / 2;
        if t_interval == Time::ZERO {
            return Err(SimulationError::invalid_config(format!(
                "minimum network delay {} is too short to form an epoch",
                min_delay
            )));
        }

        let mut group_ranges = Vec::with_capacity(self.groups.len());
        let mut next_cell = 0usize;
        for (group_index, (_, gids)) in self.groups.iter().enumerate() {
            let range = communicator.group_queue_range(group_index);
            if range.start != next_cell || range.len() != gids.len() {
                return Err(SimulationError::invalid_config(format!(
                    "queue range {:?} of group {} does not match its {} cells at offset {}",
                    range,
                    group_index,
                    gids.len(),
                    next_cell
                )));
            }
            next_cell = range.end;
            group_ranges.push(range);
        }

        let mut gid_to_local = HashMap::with_capacity(num_cells);
        let mut cell_index = 0u32;
        for (group_index, (_, gids)) in self.groups.iter().enumerate() {
            for gid in gids {
                let info = GidLocalInfo {
                    cell_index,
                    group_index: group_index as u32,
                };
                if gid_to_local.insert(*gid, info).is_some() {
                    return Err(SimulationError::invalid_config(format!(
                        "cell {} appears in more than one group",
                        gid
                    )));
                }
                cell_index += 1;
            }
        }

        let mut event_generators: Vec<Vec<EventGenerator>> =
            (0..num_cells).map(|_| Vec::new()).collect();
        for (gid, generator) in self.generators {
            let info = gid_to_local.get(&gid).ok_or_else(|| {
                SimulationError::invalid_config(format!(
                    "event generator attached to unknown cell {}",
                    gid
                ))
            })?;
            event_generators[info.cell_index as usize].push(generator);
        }

        let num_threads = pool.num_threads();
        let cell_groups = self.groups.into_iter().map(|(group, _)| group).collect();

        Ok(Simulation {
            epoch: Epoch::default(),
            t_interval,
            cell_groups,
            group_ranges,
            event_generators,
            gid_to_local,
            communicator,
            pool,
            pending_events: vec![Vec::new(); num_cells],
            event_lanes: [vec![Vec::new(); num_cells], vec![Vec::new(); num_cells]],
            local_spikes: [SpikeStore::new(num_threads), SpikeStore::new(num_threads)],
            sampler_handles: HandleSet::new(),
            local_spike_callback: None,
            global_spike_callback: None,
        })
    }
}

/// The epoch-pipelined simulation driver.
///
/// Owns the cell groups, the communicator, and all double-buffered state;
/// collaborators only ever see non-owning views.
pub struct Simulation {
    // Last completed epoch. On entry to and exit from `run` with
    // epoch.id == k, Update(k) and Exchange(k) have completed.
    epoch: Epoch,
    // Maximum epoch duration, half the minimum network delay.
    t_interval: Time,
    cell_groups: Vec<Box<dyn CellGroup>>,
    // Slice of the per-cell lane vector owned by each group.
    group_ranges: Vec<Range<usize>>,
    // One set of generators per local cell.
    event_generators: Vec<Vec<EventGenerator>>,
    gid_to_local: HashMap<Gid, GidLocalInfo>,
    communicator: Box<dyn Communicator>,
    pool: TaskPool,
    // Events awaiting the next enqueue, one buffer per local cell.
    pending_events: Vec<Vec<Event>>,
    // Double-buffered per-cell event lanes, indexed by epoch parity.
    event_lanes: [Vec<EventLane>; 2],
    // Double-buffered spike accumulators, indexed by epoch parity.
    local_spikes: [SpikeStore; 2],
    sampler_handles: HandleSet,
    local_spike_callback: Option<SpikeCallback>,
    global_spike_callback: Option<SpikeCallback>,
}

impl Simulation {
    /// Start assembling a simulation
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Advance the simulation to `t_final` in epochs of at most half the
    /// minimum network delay, integrating with timestep `dt`.
    ///
    /// Returns the time actually reached, the end of the last completed
    /// epoch. A later call resumes from there.
    ///
    /// Writing U(k) for the update of epoch k, D(k) for the exchange of the
    /// spikes it produced, and E(k) for the enqueue of its event lanes, the
    /// schedule below realizes the dependencies
    ///
    /// ```text
    /// E(k) < U(k),  U(k) < D(k),  U(k) < U(k+1),
    /// D(k) < E(k+2),  D(k) < D(k+1)
    /// ```
    ///
    /// by running U(k) concurrently with D(k-1) and E(k+1), while D and E
    /// stay serialized on their side of the join (both touch the pending
    /// buffers).
    pub fn run(&mut self, t_final: Time, dt: Time) -> Result<Time> {
        if dt == Time::ZERO {
            return Err(SimulationError::InvalidTimestep {
                dt_ns: dt.as_nanos(),
            });
        }
        if t_final <= self.epoch.t1 {
            return Ok(self.epoch.t1);
        }

        log::info!(
            "running to {:.3}ms with dt {:.4}ms",
            t_final.as_millis_f64(),
            dt.as_millis_f64()
        );

        let interval = self.t_interval;
        let next_epoch = |epoch: Epoch| {
            let mut next = epoch;
            next.advance_to(cmp::min(next.t1 + interval, t_final));
            next
        };

        let mut prev;
        let mut current = next_epoch(self.epoch);
        let mut next = next_epoch(current);

        if next.is_empty() {
            // Single remaining epoch: no overlap to exploit.
            self.enqueue_serial(current);
            self.update_serial(current, dt)?;
            self.exchange_serial(current)?;
        } else {
            self.enqueue_serial(current);

            self.pipeline_step(None, current, Some(next), dt)?;

            loop {
                prev = current;
                current = next;
                next = next_epoch(next);
                if next.is_empty() {
                    break;
                }
                self.pipeline_step(Some(prev), current, Some(next), dt)?;
            }

            self.pipeline_step(Some(prev), current, None, dt)?;

            self.exchange_serial(current)?;
        }

        self.epoch = current;
        log::debug!(
            "reached {:.3}ms at epoch {}",
            current.t1.as_millis_f64(),
            current.id
        );
        Ok(current.t1)
    }

    /// Return the simulation to its initial state: zero-width epoch, fresh
    /// cell groups and generators, empty lanes, pending buffers, and spike
    /// stores, and a reset communicator.
    pub fn reset(&mut self) {
        {
            let Simulation {
                cell_groups, pool, ..
            } = self;
            pool.for_each_mut(cell_groups, |_, group| group.reset());
        }

        for lanes in &mut self.event_lanes {
            for lane in lanes.iter_mut() {
                lane.clear();
            }
        }
        for generators in &mut self.event_generators {
            for generator in generators.iter_mut() {
                generator.reset();
            }
        }
        for pending in &mut self.pending_events {
            pending.clear();
        }
        self.communicator.reset();
        for spikes in &self.local_spikes {
            spikes.clear();
        }
        self.epoch = Epoch::default();
        log::info!("simulation reset");
    }

    /// Register a sampler with every cell group and return its handle
    pub fn add_sampler(
        &mut self,
        probes: ProbePredicate,
        schedule: Schedule,
        sampler: SamplerFn,
        policy: SamplingPolicy,
    ) -> SamplerHandle {
        let handle = self.sampler_handles.acquire();
        let association = SamplerAssociation {
            handle,
            probes,
            schedule,
            sampler,
            policy,
        };
        let Simulation {
            cell_groups, pool, ..
        } = self;
        pool.for_each_mut(cell_groups, |_, group| {
            group.add_sampler(association.clone())
        });
        handle
    }

    /// Remove the sampler with the given handle from every cell group
    pub fn remove_sampler(&mut self, handle: SamplerHandle) {
        {
            let Simulation {
                cell_groups, pool, ..
            } = self;
            pool.for_each_mut(cell_groups, |_, group| group.remove_sampler(handle));
        }
        self.sampler_handles.release(handle);
    }

    /// Remove every sampler from every cell group
    pub fn remove_all_samplers(&mut self) {
        {
            let Simulation {
                cell_groups, pool, ..
            } = self;
            pool.for_each_mut(cell_groups, |_, group| group.remove_all_samplers());
        }
        self.sampler_handles.clear();
    }

    /// Metadata for the given probe; empty when the gid is not local
    pub fn probe_metadata(&self, probe: ProbeId) -> Vec<ProbeMetadata> {
        match self.gid_to_local.get(&probe.gid) {
            Some(info) => self.cell_groups[info.group_index as usize].probe_metadata(probe),
            None => Vec::new(),
        }
    }

    /// Total number of spikes exchanged so far
    pub fn num_spikes(&self) -> usize {
        self.communicator.num_spikes()
    }

    /// Set the event-time binning policy on every cell group
    pub fn set_binning_policy(&mut self, kind: BinningKind, interval: Time) {
        let Simulation {
            cell_groups, pool, ..
        } = self;
        pool.for_each_mut(cell_groups, |_, group| {
            group.set_binning_policy(kind, interval)
        });
    }

    /// Install a callback receiving the globally collated spikes of every
    /// epoch, replacing any previous one
    pub fn set_global_spike_callback(&mut self, callback: SpikeCallback) {
        self.global_spike_callback = Some(callback);
    }

    /// Install a callback receiving the locally generated spikes of every
    /// epoch, replacing any previous one
    pub fn set_local_spike_callback(&mut self, callback: SpikeCallback) {
        self.local_spike_callback = Some(callback);
    }

    /// Push events onto the pending buffers of their target cells.
    ///
    /// Fails with [`SimulationError::BadEventTime`] if an event predates the
    /// current simulation time; events pushed before the failing one are
    /// retained. Events for cells this rank does not own are dropped.
    pub fn inject_events(&mut self, events: &[(Gid, Vec<Event>)]) -> Result<()> {
        for (gid, cell_events) in events {
            for event in cell_events {
                if event.time < self.epoch.t1 {
                    return Err(SimulationError::BadEventTime {
                        time_ns: event.time.as_nanos(),
                        horizon_ns: self.epoch.t1.as_nanos(),
                    });
                }
                match self.gid_to_local.get(gid) {
                    Some(info) => self.pending_events[info.cell_index as usize].push(*event),
                    None => log::debug!("dropping injected event for non-local cell {}", gid),
                }
            }
        }
        Ok(())
    }

    /// End of the last completed epoch
    pub fn current_time(&self) -> Time {
        self.epoch.t1
    }

    /// Minimum synaptic delay of the network, as reported by the transport
    pub fn min_delay(&self) -> Time {
        self.communicator.min_delay()
    }

    /// One pipeline barrier: Exchange(prev) then Enqueue(next) on one task,
    /// Update(current) on the other. D and E share a task because both touch
    /// the pending buffers; Update only reads the current lane side.
    fn pipeline_step(
        &mut self,
        exchange_for: Option<Epoch>,
        update_for: Epoch,
        enqueue_for: Option<Epoch>,
        dt: Time,
    ) -> Result<()> {
        let Simulation {
            cell_groups,
            group_ranges,
            event_generators,
            communicator,
            pool,
            pending_events,
            event_lanes,
            local_spikes,
            local_spike_callback,
            global_spike_callback,
            ..
        } = self;

        let (read_lanes, write_lanes) = lane_sides(event_lanes, update_for.lane_index());
        let spike_stores: &[SpikeStore; 2] = local_spikes;

        let comm_task = || -> Result<()> {
            if let Some(prev) = exchange_for {
                exchange_spikes(
                    communicator.as_mut(),
                    &spike_stores[prev.lane_index()],
                    pending_events,
                    local_spike_callback,
                    global_spike_callback,
                )?;
            }
            if let Some(next) = enqueue_for {
                enqueue_events(
                    next,
                    pending_events,
                    read_lanes,
                    write_lanes,
                    event_generators,
                    pool,
                );
            }
            Ok(())
        };

        let update_task = || -> Result<()> {
            update_groups(
                cell_groups,
                group_ranges,
                read_lanes,
                &spike_stores[update_for.lane_index()],
                update_for,
                dt,
                pool,
            )
        };

        let (comm_result, update_result) = pool.join(comm_task, update_task);
        comm_result?;
        update_result
    }

    fn enqueue_serial(&mut self, next: Epoch) {
        let Simulation {
            event_generators,
            pool,
            pending_events,
            event_lanes,
            ..
        } = self;
        // The lane side written for `next` is read for `next.id - 1`.
        let (read_lanes, write_lanes) = lane_sides(event_lanes, 1 - next.lane_index());
        enqueue_events(
            next,
            pending_events,
            read_lanes,
            write_lanes,
            event_generators,
            pool,
        );
    }

    fn update_serial(&mut self, current: Epoch, dt: Time) -> Result<()> {
        let Simulation {
            cell_groups,
            group_ranges,
            pool,
            event_lanes,
            local_spikes,
            ..
        } = self;
        update_groups(
            cell_groups,
            group_ranges,
            &event_lanes[current.lane_index()],
            &local_spikes[current.lane_index()],
            current,
            dt,
            pool,
        )
    }

    fn exchange_serial(&mut self, epoch: Epoch) -> Result<()> {
        let Simulation {
            communicator,
            pending_events,
            local_spikes,
            local_spike_callback,
            global_spike_callback,
            ..
        } = self;
        exchange_spikes(
            communicator.as_mut(),
            &local_spikes[epoch.lane_index()],
            pending_events,
            local_spike_callback,
            global_spike_callback,
        )
    }
}

/// Split the double buffer into the side read by Update(k) and the side
/// written by Enqueue(k+1)
fn lane_sides(
    lanes: &mut [Vec<EventLane>; 2],
    read_index: usize,
) -> (&Vec<EventLane>, &mut Vec<EventLane>) {
    let (first, second) = lanes.split_at_mut(1);
    if read_index == 0 {
        (&first[0], &mut second[0])
    } else {
        (&second[0], &mut first[0])
    }
}

/// Update task: clear this epoch's spike store, advance every cell group
/// over its slice of the event lanes, and drain the emitted spikes into the
/// per-thread shards.
fn update_groups(
    groups: &mut [Box<dyn CellGroup>],
    group_ranges: &[Range<usize>],
    lanes: &[EventLane],
    spikes: &SpikeStore,
    epoch: Epoch,
    dt: Time,
    pool: &TaskPool,
) -> Result<()> {
    spikes.clear();
    pool.try_for_each_mut(groups, |group_index, group| {
        let range = &group_ranges[group_index];
        group.advance(epoch, dt, &lanes[range.start..range.end])?;
        spikes.insert(group.spikes());
        group.clear_spikes();
        Ok::<(), spindle_core::CoreError>(())
    })
    .map_err(SimulationError::from)
}

/// Exchange task: gather this epoch's local spikes, run the collective,
/// present both spike sets to the registered callbacks (local first), and
/// append the translated events to the pending buffers.
fn exchange_spikes(
    communicator: &mut dyn Communicator,
    spikes: &SpikeStore,
    pending_events: &mut [Vec<Event>],
    local_callback: &mut Option<SpikeCallback>,
    global_callback: &mut Option<SpikeCallback>,
) -> Result<()> {
    let local = spikes.gather();
    let global = communicator.exchange(&local)?;

    if let Some(callback) = local_callback.as_mut() {
        callback(&local);
    }
    if let Some(callback) = global_callback.as_mut() {
        callback(&global);
    }

    communicator.make_event_queues(&global, pending_events);
    Ok(())
}

/// Enqueue task: per cell, sort the pending events and merge them with the
/// carry-over from the previous lane and the generator events for the next
/// epoch into the next lane side.
fn enqueue_events(
    next: Epoch,
    pending_events: &mut [Vec<Event>],
    read_lanes: &[EventLane],
    write_lanes: &mut [EventLane],
    generators: &mut [Vec<EventGenerator>],
    pool: &TaskPool,
) {
    pool.install(|| {
        #[cfg(feature = "parallel")]
        {
            (
                pending_events.par_iter_mut(),
                write_lanes.par_iter_mut(),
                generators.par_iter_mut(),
                read_lanes.par_iter(),
            )
                .into_par_iter()
                .for_each(|(pending, lane, cell_generators, old)| {
                    pending.sort_unstable_by(event_order);
                    merge_cell_events(next.t0, next.t1, old, pending, cell_generators, lane);
                    pending.clear();
                });
        }
        #[cfg(not(feature = "parallel"))]
        {
            for (((pending, lane), cell_generators), old) in pending_events
                .iter_mut()
                .zip(write_lanes.iter_mut())
                .zip(generators.iter_mut())
                .zip(read_lanes.iter())
            {
                pending.sort_unstable_by(event_order);
                merge_cell_events(next.t0, next.t1, old, pending, cell_generators, lane);
                pending.clear();
            }
        }
    });
}
