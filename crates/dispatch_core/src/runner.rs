//! Discrete-event runner: pops events off the clock and runs the schedule.
//!
//! Each pop advances simulation time to the event's timestamp, publishes the
//! event as [`CurrentEvent`] and runs every system once; the `is_*` run
//! conditions gate execution to the system that handles the popped kind.
//! Events carrying a stale generation are dropped here, before any system
//! sees them.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::session::SimulationSession;
use crate::systems::completion::session_completed_system;
use crate::systems::countdown::countdown_tick_system;
use crate::systems::negotiation::{
    call_answered_system, dispatch_decision_system, place_call_system,
};
use crate::systems::reroute::reroute_analysis_system;
use crate::systems::tracking::{tracking_started_system, tracking_tick_system};
use crate::systems::traffic::traffic_check_system;

macro_rules! event_condition {
    ($name:ident, $kind:ident) => {
        pub fn $name(event: Option<Res<CurrentEvent>>) -> bool {
            matches!(event, Some(e) if e.0.kind == EventKind::$kind)
        }
    };
}

event_condition!(is_countdown_tick, CountdownTick);
event_condition!(is_place_call, PlaceCall);
event_condition!(is_call_answered, CallAnswered);
event_condition!(is_dispatch_decision, DispatchDecision);
event_condition!(is_tracking_started, TrackingStarted);
event_condition!(is_tracking_tick, TrackingTick);
event_condition!(is_traffic_check, TrafficCheck);
event_condition!(is_reroute_analysis, RerouteAnalysis);
event_condition!(is_session_completed, SessionCompleted);

/// Builds the schedule wiring every dispatch system to its event kind.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        countdown_tick_system.run_if(is_countdown_tick),
        place_call_system.run_if(is_place_call),
        call_answered_system.run_if(is_call_answered),
        dispatch_decision_system.run_if(is_dispatch_decision),
        tracking_started_system.run_if(is_tracking_started),
        tracking_tick_system.run_if(is_tracking_tick),
        traffic_check_system.run_if(is_traffic_check),
        reroute_analysis_system.run_if(is_reroute_analysis),
        session_completed_system.run_if(is_session_completed),
    ));
    schedule
}

/// Pops and executes the next pending event. Returns false when the clock has
/// drained. A stale-generation event is consumed without running the schedule.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = {
        let mut clock = world.resource_mut::<SimulationClock>();
        match clock.pop_next() {
            Some(event) => event,
            None => return false,
        }
    };

    let live_generation = world.resource::<SimulationSession>().generation;
    if event.generation != live_generation {
        return true;
    }

    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Drains the clock, running at most `max_steps` events. Returns the number
/// of events consumed; hitting the cap with events still pending indicates a
/// runaway schedule.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Like [`run_until_empty`] but invokes `hook` after every consumed event,
/// giving callers a read-only observation point between events.
pub fn run_until_empty_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut hook: F,
) -> usize
where
    F: FnMut(&World),
{
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
        hook(world);
    }
    steps
}
