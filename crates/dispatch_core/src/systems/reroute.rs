//! Rerouting evaluation: can a unit from another facility arrive sooner?
//!
//! The candidate is promoted only when its ETA beats the current unit's ETA
//! including the traffic delay; otherwise the current unit is kept. Either
//! way the evaluation counts toward the session's reroute tally.

use bevy_ecs::prelude::{Res, ResMut};
use rand::Rng;

use crate::clock::{CurrentEvent, SimulationClock};
use crate::event_log::EventLog;
use crate::hospitals::HospitalDirectoryResource;
use crate::scenario::RerouteConfig;
use crate::session::{DispatchUnit, Phase, SimulationSession, UnitStatus};
use crate::systems::decision_rng;

pub fn reroute_analysis_system(
    clock: Res<SimulationClock>,
    mut session: ResMut<SimulationSession>,
    mut log: ResMut<EventLog>,
    event: Res<CurrentEvent>,
    directory: Res<HospitalDirectoryResource>,
    reroute: Res<RerouteConfig>,
) {
    if session.phase != Phase::Tracking || event.0.generation != session.generation {
        return;
    }

    let now = clock.now();
    session.reroute_count += 1;

    let selected_name = session
        .selected_hospital
        .as_ref()
        .map(|h| h.name.clone())
        .unwrap_or_default();
    let alternative = directory
        .0
        .nearby()
        .into_iter()
        .find(|h| h.name != selected_name);
    let alternative = match alternative {
        Some(hospital) => hospital,
        None => {
            log.append(now, "No alternative units available nearby");
            return;
        }
    };

    let draw = session.next_draw();
    let mut rng = decision_rng(reroute.seed, draw);
    let candidate_eta = if reroute.max_candidate_eta_minutes > reroute.min_candidate_eta_minutes {
        rng.gen_range(reroute.min_candidate_eta_minutes..=reroute.max_candidate_eta_minutes)
    } else {
        reroute.min_candidate_eta_minutes
    } as f64;

    if candidate_eta < session.eta_minutes + session.delay_minutes as f64 {
        if let Some(unit) = session.primary_unit.as_mut() {
            unit.status = UnitStatus::Cancelled;
        }
        let unit_id = session.next_unit_id();
        session.backup_unit = Some(DispatchUnit {
            id: unit_id,
            origin_facility: alternative.name.clone(),
            eta_minutes: candidate_eta,
            status: UnitStatus::Dispatched,
        });
        session.eta_minutes = candidate_eta;
        log.append(
            now,
            format!(
                "Found faster option: unit from {} arriving in {candidate_eta:.0} min, rerouting",
                alternative.name
            ),
        );
    } else {
        log.append(now, "No faster alternative found, keeping current unit");
    }
}
