//! Countdown system: fixed-length cancellable delay before negotiation.

use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::event_log::EventLog;
use crate::scenario::{CountdownConfig, SpeedMultiplier};
use crate::session::{Phase, SimulationSession};

pub fn countdown_tick_system(
    mut clock: ResMut<SimulationClock>,
    mut session: ResMut<SimulationSession>,
    mut log: ResMut<EventLog>,
    event: Res<CurrentEvent>,
    countdown: Res<CountdownConfig>,
    speed: Res<SpeedMultiplier>,
) {
    if session.phase != Phase::Countdown || event.0.generation != session.generation {
        return;
    }

    let now = clock.now();
    session.countdown_remaining = session.countdown_remaining.saturating_sub(1);

    if session.countdown_remaining > 0 {
        log.append(
            now,
            format!("Dispatching in {}s, cancel to abort", session.countdown_remaining),
        );
        clock.schedule_in(
            speed.scale_ms(countdown.tick_interval_ms),
            EventKind::CountdownTick,
            session.generation,
        );
    } else {
        session.phase = Phase::Calling;
        log.append(now, "Countdown complete, contacting nearest hospital");
        clock.schedule_in(0, EventKind::PlaceCall, session.generation);
    }
}
