//! Postsynaptic events and per-cell event lanes

use crate::time::Time;
use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A postsynaptic event scheduled for delivery to a local cell.
///
/// `target` addresses a synapse target index on the receiving cell; the cell
/// itself is identified by the lane the event sits in.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    /// Delivery time
    pub time: Time,
    /// Synapse target index on the receiving cell
    pub target: u32,
    /// Synaptic weight applied on delivery
    pub weight: f32,
}

impl Event {
    /// Create a new postsynaptic event
    pub const fn new(time: Time, target: u32, weight: f32) -> Self {
        Self {
            time,
            target,
            weight,
        }
    }
}

/// The ordered event queue consumed by one local cell during an update.
///
/// The front of a lane holds the events of the owning epoch; the tail may
/// carry events for later epochs, which the merger carries over.
pub type EventLane = Vec<Event>;

/// Total order over events: time, then target, then weight bits.
///
/// Time alone decides delivery order; the remaining fields make the order
/// total so that sorting is deterministic and identical across ranks.
pub fn event_order(a: &Event, b: &Event) -> Ordering {
    a.time
        .cmp(&b.time)
        .then(a.target.cmp(&b.target))
        .then(a.weight.to_bits().cmp(&b.weight.to_bits()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_order_is_total() {
        let mut events = vec![
            Event::new(Time::from_millis(2), 1, 0.5),
            Event::new(Time::from_millis(2), 0, 0.5),
            Event::new(Time::from_millis(1), 7, 0.5),
            Event::new(Time::from_millis(2), 1, 0.25),
        ];
        events.sort_unstable_by(event_order);
        assert_eq!(events[0].time, Time::from_millis(1));
        assert_eq!(events[1].target, 0);
        assert_eq!(events[2].weight, 0.25);
        assert_eq!(events[3].weight, 0.5);
    }

    #[test]
    fn test_equal_events_compare_equal() {
        let a = Event::new(Time::from_millis(1), 2, 1.0);
        let b = Event::new(Time::from_millis(1), 2, 1.0);
        assert_eq!(event_order(&a, &b), Ordering::Equal);
    }
}
