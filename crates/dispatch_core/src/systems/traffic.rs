//! Traffic check: resolves the traffic condition during tracking.
//!
//! Heavy traffic always triggers a rerouting evaluation; moderate traffic
//! triggers one with configurable probability; light traffic does nothing.

use bevy_ecs::prelude::{Res, ResMut};
use rand::Rng;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::event_log::EventLog;
use crate::scenario::{RerouteConfig, TrafficConfig};
use crate::session::{Phase, SimulationSession, TrafficLevel};
use crate::statistics::StatisticsRecorder;
use crate::systems::decision_rng;

fn delay_for(rng: &mut impl Rng, min: u32, max: u32) -> u32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

pub fn traffic_check_system(
    mut clock: ResMut<SimulationClock>,
    mut session: ResMut<SimulationSession>,
    mut log: ResMut<EventLog>,
    mut stats: ResMut<StatisticsRecorder>,
    event: Res<CurrentEvent>,
    traffic: Res<TrafficConfig>,
    reroute: Res<RerouteConfig>,
) {
    if session.phase != Phase::Tracking || event.0.generation != session.generation {
        return;
    }

    let now = clock.now();
    let draw = session.next_draw();
    let mut rng = decision_rng(traffic.seed, draw);

    let level = traffic.level_override.unwrap_or_else(|| {
        match rng.gen_range(0..3u8) {
            0 => TrafficLevel::Light,
            1 => TrafficLevel::Moderate,
            _ => TrafficLevel::Heavy,
        }
    });
    session.traffic_level = level;

    match level {
        TrafficLevel::Heavy => {
            let delay = delay_for(
                &mut rng,
                traffic.min_heavy_delay_minutes,
                traffic.max_heavy_delay_minutes,
            );
            session.delay_minutes += delay;
            session.eta_minutes += delay as f64;
            stats.add_traffic_delay(delay);
            log.append(
                now,
                format!("Heavy traffic ahead, ETA increased by {delay} min"),
            );
            log.append(now, "Evaluating faster routes");
            clock.schedule_in(
                reroute.analysis_delay_ms,
                EventKind::RerouteAnalysis,
                session.generation,
            );
        }
        TrafficLevel::Moderate => {
            let delay = delay_for(
                &mut rng,
                traffic.min_moderate_delay_minutes,
                traffic.max_moderate_delay_minutes,
            );
            session.delay_minutes += delay;
            session.eta_minutes += delay as f64;
            stats.add_traffic_delay(delay);
            log.append(
                now,
                format!("Moderate traffic, ETA increased by {delay} min"),
            );
            if rng.gen_bool(traffic.moderate_reroute_probability.clamp(0.0, 1.0)) {
                log.append(now, "Evaluating faster routes");
                clock.schedule_in(
                    reroute.analysis_delay_ms,
                    EventKind::RerouteAnalysis,
                    session.generation,
                );
            }
        }
        TrafficLevel::Light => {
            log.append(now, "Traffic is light, ambulance on schedule");
        }
    }
}
