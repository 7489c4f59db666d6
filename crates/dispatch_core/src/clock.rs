use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;

pub const ONE_SEC_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    CountdownTick,
    PlaceCall,
    CallAnswered,
    DispatchDecision,
    TrackingStarted,
    TrackingTick,
    TrafficCheck,
    RerouteAnalysis,
    SessionCompleted,
}

/// A scheduled simulation event. `generation` is the cancellation token of the
/// session that scheduled it; events whose generation no longer matches the
/// live session are dropped by the runner before any system sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub generation: u64,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.kind.cmp(&self.kind))
            .then_with(|| other.generation.cmp(&self.generation))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event most recently popped by the runner, visible to systems for one
/// schedule pass.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// Discrete-event clock: simulation time in milliseconds plus a min-heap of
/// pending events. Timers and intervals are expressed as scheduled events, so
/// clearing the heap cancels every pending callback at once.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, generation: u64) {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        self.events.push(Event {
            timestamp,
            kind,
            generation,
        });
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, generation: u64) {
        self.schedule_at(self.now.saturating_add(delay_ms), kind, generation);
    }

    pub fn schedule_in_secs(&mut self, delay_secs: u64, kind: EventKind, generation: u64) {
        self.schedule_in(delay_secs * ONE_SEC_MS, kind, generation);
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|e| e.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drops every pending event. Time is not rewound. Used on session reset:
    /// a cancelled session must leave zero timers behind.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
