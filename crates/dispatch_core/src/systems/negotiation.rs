//! Negotiation systems: the simulated hospital call.
//!
//! Three stages, each a scheduled event: placing the call (latency), the
//! answered/unanswered outcome, and the approve/decline decision. Every path
//! ends in a dispatch decision within bounded time; an unanswered or declined
//! call falls back to automatic dispatch rather than blocking.

use bevy_ecs::prelude::{Res, ResMut};
use rand::Rng;

use crate::clock::{CurrentEvent, EventKind, SimulationClock, ONE_SEC_MS};
use crate::event_log::EventLog;
use crate::hospitals::HospitalDirectoryResource;
use crate::scenario::{NegotiationConfig, SpeedMultiplier};
use crate::session::{DispatchUnit, Phase, SimulationSession, UnitStatus};
use crate::systems::decision_rng;

pub fn place_call_system(
    mut clock: ResMut<SimulationClock>,
    mut session: ResMut<SimulationSession>,
    mut log: ResMut<EventLog>,
    event: Res<CurrentEvent>,
    directory: Res<HospitalDirectoryResource>,
    negotiation: Res<NegotiationConfig>,
) {
    if session.phase != Phase::Calling || event.0.generation != session.generation {
        return;
    }

    let now = clock.now();
    let hospital = match directory.0.nearby().into_iter().next() {
        Some(hospital) => hospital,
        None => {
            // Session-fatal: nothing to dispatch from. The process continues.
            log.append(now, "No hospitals available, dispatch aborted");
            session.reset_to_idle();
            clock.clear();
            return;
        }
    };

    log.append(
        now,
        format!("Calling {} ({:.1} km away)", hospital.name, hospital.distance_km),
    );
    session.selected_hospital = Some(hospital);

    let draw = session.next_draw();
    let mut rng = decision_rng(negotiation.seed, draw);
    let latency = if negotiation.max_call_latency_ms > negotiation.min_call_latency_ms {
        rng.gen_range(negotiation.min_call_latency_ms..negotiation.max_call_latency_ms)
    } else {
        negotiation.min_call_latency_ms
    };
    clock.schedule_in(latency, EventKind::CallAnswered, session.generation);
}

pub fn call_answered_system(
    mut clock: ResMut<SimulationClock>,
    mut session: ResMut<SimulationSession>,
    mut log: ResMut<EventLog>,
    event: Res<CurrentEvent>,
    negotiation: Res<NegotiationConfig>,
    speed: Res<SpeedMultiplier>,
) {
    if session.phase != Phase::Calling || event.0.generation != session.generation {
        return;
    }

    let now = clock.now();
    let draw = session.next_draw();
    let mut rng = decision_rng(negotiation.seed, draw);
    let answered = rng.gen_bool(negotiation.answer_probability.clamp(0.0, 1.0));
    session.call_answered = answered;

    let name = session
        .selected_hospital
        .as_ref()
        .map(|h| h.name.clone())
        .unwrap_or_default();

    if answered {
        log.append(now, format!("{name} answered, explaining the situation"));
        clock.schedule_in(
            speed.scale_ms(negotiation.explain_delay_ms),
            EventKind::DispatchDecision,
            session.generation,
        );
    } else {
        log.append(now, format!("No answer from {name}, requesting automatic dispatch"));
        clock.schedule_in(0, EventKind::DispatchDecision, session.generation);
    }
}

pub fn dispatch_decision_system(
    mut clock: ResMut<SimulationClock>,
    mut session: ResMut<SimulationSession>,
    mut log: ResMut<EventLog>,
    event: Res<CurrentEvent>,
    negotiation: Res<NegotiationConfig>,
) {
    if session.phase != Phase::Calling || event.0.generation != session.generation {
        return;
    }

    let now = clock.now();
    let approved = if session.call_answered {
        let probability = negotiation
            .approval_override
            .unwrap_or_else(|| session.urgency.approval_probability());
        let draw = session.next_draw();
        let mut rng = decision_rng(negotiation.seed, draw);
        rng.gen_bool(probability.clamp(0.0, 1.0))
    } else {
        false
    };

    let name = session
        .selected_hospital
        .as_ref()
        .map(|h| h.name.clone())
        .unwrap_or_default();

    if approved {
        log.append(now, format!("{name} approved the dispatch request"));
    } else if session.call_answered {
        log.append(now, format!("{name} declined, falling back to automatic dispatch"));
    } else {
        log.append(now, "Automatic dispatch engaged");
    }

    session.phase = Phase::Dispatch;
    let unit_id = session.next_unit_id();
    log.append(now, format!("Ambulance {unit_id} dispatched from {name}"));
    session.primary_unit = Some(DispatchUnit {
        id: unit_id,
        origin_facility: name,
        eta_minutes: 0.0,
        status: UnitStatus::Dispatched,
    });

    clock.schedule_in(ONE_SEC_MS, EventKind::TrackingStarted, session.generation);
}
