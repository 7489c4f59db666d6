//! Tracking systems: trip ETA, live progress interpolation and arrival.
//!
//! The ETA prefers a routing-provider result (live traffic); when the
//! provider or the requester's geolocation is unavailable it falls back to
//! the distance-based formula. Progress advances on a one-second tick chain;
//! the chain is the only interval, so a duplicate start request is a no-op.

use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::event_log::EventLog;
use crate::geo::GeolocationResource;
use crate::routing::{fallback_eta_minutes, RoutingProviderResource};
use crate::scenario::{SpeedMultiplier, TrackingConfig, TrafficConfig};
use crate::session::{Phase, SimulationSession, UnitStatus};
use crate::statistics::StatisticsRecorder;

pub fn tracking_started_system(
    mut clock: ResMut<SimulationClock>,
    mut session: ResMut<SimulationSession>,
    mut log: ResMut<EventLog>,
    mut stats: ResMut<StatisticsRecorder>,
    event: Res<CurrentEvent>,
    routing: Res<RoutingProviderResource>,
    geolocation: Res<GeolocationResource>,
    tracking: Res<TrackingConfig>,
    traffic: Res<TrafficConfig>,
) {
    if event.0.generation != session.generation {
        return;
    }
    if session.phase == Phase::Tracking {
        // The tick chain is already running; a second one would double the
        // progress rate for this session.
        log::warn!(
            "tracking already active for session {}, ignoring duplicate start",
            session.id
        );
        return;
    }
    if session.phase != Phase::Dispatch {
        return;
    }

    let hospital = match session.selected_hospital.clone() {
        Some(hospital) => hospital,
        None => return,
    };

    let now = clock.now();
    let provider_eta = geolocation
        .0
        .current_position()
        .and_then(|from| routing.0.route(from, hospital.position))
        .map(|estimate| estimate.eta_minutes);

    let eta_minutes = match provider_eta {
        Some(eta) => eta,
        None => {
            log::warn!("routing provider unavailable, using distance-based estimate");
            log.append(now, "Routing unavailable, using distance-based ETA");
            fallback_eta_minutes(hospital.distance_km, session.traffic_level)
        }
    };

    session.eta_minutes = eta_minutes;
    if let Some(unit) = session.primary_unit.as_mut() {
        unit.eta_minutes = eta_minutes;
    }
    stats.record_original_eta(eta_minutes);

    session.phase = Phase::Tracking;
    log.append(now, format!("Ambulance en route, ETA {eta_minutes:.0} min"));

    clock.schedule_in(
        tracking.tick_interval_ms,
        EventKind::TrackingTick,
        session.generation,
    );
    clock.schedule_in(
        traffic.check_delay_ms,
        EventKind::TrafficCheck,
        session.generation,
    );
}

pub fn tracking_tick_system(
    mut clock: ResMut<SimulationClock>,
    mut session: ResMut<SimulationSession>,
    mut log: ResMut<EventLog>,
    event: Res<CurrentEvent>,
    tracking: Res<TrackingConfig>,
    speed: Res<SpeedMultiplier>,
) {
    if session.phase != Phase::Tracking || event.0.generation != session.generation {
        return;
    }

    let now = clock.now();
    let increment = if session.eta_minutes > 0.0 {
        (100.0 / (session.eta_minutes * 60.0)) * speed.0
    } else {
        100.0
    };
    session.advance_progress(increment);

    for threshold in session.newly_crossed_milestones() {
        log.append(now, format!("Ambulance is {threshold}% of the way there"));
    }

    if session.progress_percent >= 100.0 {
        if let Some(unit) = session.active_unit_mut() {
            unit.status = UnitStatus::Arrived;
        }
        log.append(now, "Ambulance has arrived at the scene");
        clock.schedule_in(
            tracking.arrival_settle_ms,
            EventKind::SessionCompleted,
            session.generation,
        );
    } else {
        clock.schedule_in(
            tracking.tick_interval_ms,
            EventKind::TrackingTick,
            session.generation,
        );
    }
}
