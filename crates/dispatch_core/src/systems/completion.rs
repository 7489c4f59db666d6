//! Completion system: freezes the session statistics after arrival.

use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, SimulationClock};
use crate::event_log::EventLog;
use crate::scenario::BaselineResponse;
use crate::session::{Phase, SimulationSession};
use crate::statistics::StatisticsRecorder;

pub fn session_completed_system(
    clock: Res<SimulationClock>,
    mut session: ResMut<SimulationSession>,
    mut log: ResMut<EventLog>,
    mut stats: ResMut<StatisticsRecorder>,
    event: Res<CurrentEvent>,
    baseline: Res<BaselineResponse>,
) {
    if session.phase != Phase::Tracking || event.0.generation != session.generation {
        return;
    }

    let now = clock.now();
    session.phase = Phase::Complete;
    session.ended_at = Some(now);

    let hospital_name = session
        .selected_hospital
        .as_ref()
        .map(|h| h.name.clone())
        .unwrap_or_default();
    let unit_id = session
        .active_unit()
        .map(|u| u.id.clone())
        .unwrap_or_default();

    let frozen = stats.finalize(
        now,
        session.eta_minutes,
        session.reroute_count,
        hospital_name,
        unit_id,
        baseline.minutes,
    );
    log.append(
        now,
        format!(
            "Dispatch complete in {:.0}s, estimated time saved {:.0} min",
            frozen.total_duration_seconds, frozen.time_saved_minutes
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::EventKind;
    use crate::runner::{run_next_event, simulation_schedule};
    use crate::scenario::{build_world, SimulationParams};
    use crate::session::{DispatchUnit, UnitStatus};

    #[test]
    fn completion_freezes_statistics() {
        let mut world = build_world(&SimulationParams::default());
        {
            let mut session = world.resource_mut::<SimulationSession>();
            session.phase = Phase::Tracking;
            session.eta_minutes = 4.0;
            session.progress_percent = 100.0;
            session.primary_unit = Some(DispatchUnit {
                id: "UNIT-1".to_string(),
                origin_facility: "Charite Campus Mitte".to_string(),
                eta_minutes: 4.0,
                status: UnitStatus::Arrived,
            });
        }
        world.resource_mut::<StatisticsRecorder>().mark_start(0);
        world
            .resource_mut::<SimulationClock>()
            .schedule_in(30_000, EventKind::SessionCompleted, 0);

        let mut schedule = simulation_schedule();
        run_next_event(&mut world, &mut schedule);

        let session = world.resource::<SimulationSession>();
        assert_eq!(session.phase, Phase::Complete);
        assert_eq!(session.ended_at, Some(30_000));

        let stats = world.resource::<StatisticsRecorder>();
        let frozen = stats.statistics().expect("finalized statistics");
        assert_eq!(frozen.total_duration_seconds, 30.0);
        assert_eq!(frozen.final_eta_minutes, 4.0);
        assert_eq!(frozen.time_saved_minutes, 14.0);
        assert_eq!(frozen.unit_id, "UNIT-1");
        assert!(world.resource::<EventLog>().contains("Dispatch complete"));
    }

    #[test]
    fn completion_requires_tracking_phase() {
        let mut world = build_world(&SimulationParams::default());
        world
            .resource_mut::<SimulationClock>()
            .schedule_in(0, EventKind::SessionCompleted, 0);
        let mut schedule = simulation_schedule();
        run_next_event(&mut world, &mut schedule);

        assert_eq!(world.resource::<SimulationSession>().phase, Phase::Idle);
        assert!(world.resource::<StatisticsRecorder>().statistics().is_none());
    }
}
