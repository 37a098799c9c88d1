//! Event generators
//!
//! A generator turns a [`Schedule`] into postsynaptic events against a fixed
//! synapse target, queried one epoch interval at a time by the enqueue step.

use crate::event::Event;
use crate::schedule::Schedule;
use crate::time::Time;

/// Produces sorted events on demand for a single cell.
///
/// The generator owns a scratch buffer so that repeated interval queries do
/// not allocate. Targets are already resolved; label resolution happens
/// outside the driver.
#[derive(Debug, Clone)]
pub struct EventGenerator {
    target: u32,
    weight: f32,
    schedule: Schedule,
    buffer: Vec<Event>,
}

impl EventGenerator {
    /// Create a generator delivering `weight` to `target` at schedule times
    pub fn new(target: u32, weight: f32, schedule: Schedule) -> Self {
        Self {
            target,
            weight,
            schedule,
            buffer: Vec::new(),
        }
    }

    /// The events in `[t0, t1)`, sorted ascending by time.
    ///
    /// The returned slice borrows the generator's internal buffer and is
    /// valid until the next call.
    pub fn events(&mut self, t0: Time, t1: Time) -> &[Event] {
        self.buffer.clear();
        for time in self.schedule.events(t0, t1) {
            self.buffer.push(Event::new(time, self.target, self.weight));
        }
        &self.buffer
    }

    /// Restart the generator to its initial state
    pub fn reset(&mut self) {
        self.schedule.reset();
        self.buffer.clear();
    }

    /// The synapse target index this generator delivers to
    pub fn target(&self) -> u32 {
        self.target
    }

    /// The weight this generator delivers
    pub fn weight(&self) -> f32 {
        self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Time {
        Time::from_millis(v)
    }

    #[test]
    fn test_generator_emits_schedule_times() {
        let sched = Schedule::regular_from(ms(1), ms(1)).unwrap();
        let mut generator = EventGenerator::new(3, 0.5, sched);

        let events = generator.events(ms(0), ms(3));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::new(ms(1), 3, 0.5));
        assert_eq!(events[1], Event::new(ms(2), 3, 0.5));
    }

    #[test]
    fn test_generator_query_is_idempotent_after_reset() {
        let sched = Schedule::explicit(vec![ms(2), ms(4)]);
        let mut generator = EventGenerator::new(0, 1.0, sched);

        let first: Vec<Event> = generator.events(ms(0), ms(5)).to_vec();
        generator.reset();
        let again: Vec<Event> = generator.events(ms(0), ms(5)).to_vec();
        assert_eq!(first, again);
    }

    #[test]
    fn test_empty_interval_yields_no_events() {
        let sched = Schedule::regular(ms(1)).unwrap();
        let mut generator = EventGenerator::new(0, 1.0, sched);
        assert!(generator.events(ms(2), ms(2)).is_empty());
    }
}
