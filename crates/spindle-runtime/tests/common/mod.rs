//! Test doubles shared by the integration suite.

use spindle_runtime::{
    BinningKind, CellGroup, CoreError, Epoch, Event, EventLane, Gid, ProbeId, ProbeMetadata,
    Sample, SamplerAssociation, SamplerHandle, Spike, Time,
};
use std::sync::{Arc, Mutex};

pub fn ms(v: u64) -> Time {
    Time::from_millis(v)
}

pub fn us(v: u64) -> Time {
    Time::from_micros(v)
}

pub fn gid(v: u64) -> Gid {
    Gid::new(v)
}

/// Everything a recording group observed, for post-run assertions.
#[derive(Default)]
pub struct RecordLog {
    /// Per local cell of the group: (epoch id, event) in delivery order.
    pub delivered: Vec<Vec<(i64, Event)>>,
    /// Every sample taken, in delivery order.
    pub samples: Vec<(SamplerHandle, ProbeId, Sample)>,
    /// Last binning policy the group was given.
    pub binning: Option<(BinningKind, Time)>,
    /// Number of reset calls.
    pub resets: usize,
}

/// A cell group that integrates nothing: it records the events it is handed,
/// emits spikes from a fixed plan, and services samplers against an
/// event-count probe (index 0) per cell.
pub struct RecordingGroup {
    gids: Vec<Gid>,
    spike_plan: Vec<Spike>,
    spike_buffer: Vec<Spike>,
    samplers: Vec<SamplerAssociation>,
    log: Arc<Mutex<RecordLog>>,
}

impl RecordingGroup {
    pub fn new(gids: Vec<Gid>) -> (Self, Arc<Mutex<RecordLog>>) {
        let log = Arc::new(Mutex::new(RecordLog {
            delivered: vec![Vec::new(); gids.len()],
            ..RecordLog::default()
        }));
        let group = Self {
            gids,
            spike_plan: Vec::new(),
            spike_buffer: Vec::new(),
            samplers: Vec::new(),
            log: Arc::clone(&log),
        };
        (group, log)
    }

    /// Emit the given spikes during the epochs containing their times.
    pub fn with_spike_plan(mut self, plan: Vec<Spike>) -> Self {
        self.spike_plan = plan;
        self
    }
}

impl CellGroup for RecordingGroup {
    fn advance(&mut self, epoch: Epoch, _dt: Time, lanes: &[EventLane]) -> Result<(), CoreError> {
        let mut log = self.log.lock().unwrap();

        // Consume the active portion of each lane; the tail belongs to
        // later epochs and stays for the carry-over merge.
        for (cell, lane) in lanes.iter().enumerate() {
            for event in lane.iter().take_while(|e| e.time < epoch.t1) {
                log.delivered[cell].push((epoch.id, *event));
            }
        }

        for association in &self.samplers {
            for time in association.schedule.events(epoch.t0, epoch.t1) {
                for (cell, cell_gid) in self.gids.iter().enumerate() {
                    let probe = ProbeId::new(*cell_gid, 0);
                    if (association.probes)(probe) {
                        let sample = Sample {
                            time,
                            value: log.delivered[cell].len() as f64,
                        };
                        let metadata = ProbeMetadata {
                            id: probe,
                            tag: "event-count".to_string(),
                            index: 0,
                        };
                        (association.sampler)(&metadata, &[sample]);
                        log.samples.push((association.handle, probe, sample));
                    }
                }
            }
        }
        drop(log);

        for spike in &self.spike_plan {
            if spike.time >= epoch.t0 && spike.time < epoch.t1 {
                self.spike_buffer.push(*spike);
            }
        }
        Ok(())
    }

    fn spikes(&self) -> &[Spike] {
        &self.spike_buffer
    }

    fn clear_spikes(&mut self) {
        self.spike_buffer.clear();
    }

    fn reset(&mut self) {
        self.spike_buffer.clear();
        let mut log = self.log.lock().unwrap();
        for delivered in &mut log.delivered {
            delivered.clear();
        }
        log.samples.clear();
        log.resets += 1;
    }

    fn add_sampler(&mut self, association: SamplerAssociation) {
        self.samplers.push(association);
    }

    fn remove_sampler(&mut self, handle: SamplerHandle) {
        self.samplers
            .retain(|association| association.handle != handle);
    }

    fn remove_all_samplers(&mut self) {
        self.samplers.clear();
    }

    fn set_binning_policy(&mut self, kind: BinningKind, interval: Time) {
        self.log.lock().unwrap().binning = Some((kind, interval));
    }

    fn probe_metadata(&self, probe: ProbeId) -> Vec<ProbeMetadata> {
        if self.gids.contains(&probe.gid) {
            vec![ProbeMetadata {
                id: probe,
                tag: "event-count".to_string(),
                index: 0,
            }]
        } else {
            Vec::new()
        }
    }
}

/// A group whose integrator always fails, for the abort path.
pub struct FailingGroup {
    spike_buffer: Vec<Spike>,
}

impl FailingGroup {
    pub fn new() -> Self {
        Self {
            spike_buffer: Vec::new(),
        }
    }
}

impl CellGroup for FailingGroup {
    fn advance(&mut self, _epoch: Epoch, _dt: Time, _lanes: &[EventLane]) -> Result<(), CoreError> {
        Err(CoreError::cell_group("integrator diverged"))
    }

    fn spikes(&self) -> &[Spike] {
        &self.spike_buffer
    }

    fn clear_spikes(&mut self) {}

    fn reset(&mut self) {}

    fn add_sampler(&mut self, _association: SamplerAssociation) {}

    fn remove_sampler(&mut self, _handle: SamplerHandle) {}

    fn remove_all_samplers(&mut self) {}

    fn set_binning_policy(&mut self, _kind: BinningKind, _interval: Time) {}

    fn probe_metadata(&self, _probe: ProbeId) -> Vec<ProbeMetadata> {
        Vec::new()
    }
}
