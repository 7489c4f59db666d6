//! Scenario setup: per-concern configuration resources and world building.
//!
//! Each stochastic concern carries its own seed so a session is fully
//! deterministic under test; the master `SimulationParams::seed` fans out to
//! the per-concern seeds when set.

use bevy_ecs::prelude::{Resource, World};

use crate::clock::SimulationClock;
use crate::event_log::EventLog;
use crate::geo::{Coordinates, FixedGeolocation, GeolocationProvider, GeolocationResource, NoGeolocation};
use crate::hospitals::{Hospital, HospitalDirectory, HospitalDirectoryResource, StaticHospitalDirectory};
use crate::routing::{build_routing_provider, RoutingProviderKind, RoutingProviderResource};
use crate::session::{SimulationSession, TrafficLevel};
use crate::statistics::StatisticsRecorder;

/// Playback speed: scales simulated minutes into fewer wall-clock seconds for
/// demonstration. Externally supplied, never computed internally.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SpeedMultiplier(pub f64);

impl SpeedMultiplier {
    /// Compresses a delay by the multiplier, never below one millisecond.
    pub fn scale_ms(&self, ms: u64) -> u64 {
        let factor = self.0.max(0.001);
        ((ms as f64 / factor).round() as u64).max(1)
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Reference response time the time-saved statistic is measured against.
#[derive(Debug, Clone, Copy, Resource)]
pub struct BaselineResponse {
    pub minutes: f64,
}

impl Default for BaselineResponse {
    fn default() -> Self {
        Self { minutes: 18.0 }
    }
}

#[derive(Debug, Clone, Copy, Resource)]
pub struct CountdownConfig {
    /// Discrete ticks before negotiation begins.
    pub ticks: u32,
    /// Nominal tick interval; scaled by the speed multiplier at trigger time.
    pub tick_interval_ms: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            ticks: 10,
            tick_interval_ms: 1000,
        }
    }
}

/// Hospital call simulation behavior.
#[derive(Debug, Clone, Copy, Resource)]
pub struct NegotiationConfig {
    /// Probability (0.0-1.0) that the hospital answers the call.
    pub answer_probability: f64,
    /// When set, replaces the urgency-derived approval probability.
    pub approval_override: Option<f64>,
    /// Call latency is uniform in [min, max) milliseconds.
    pub min_call_latency_ms: u64,
    pub max_call_latency_ms: u64,
    /// "Explain the situation" delay; scaled by the speed multiplier.
    pub explain_delay_ms: u64,
    /// Seed for RNG (for reproducibility).
    pub seed: u64,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            answer_probability: 0.7,
            approval_override: None,
            min_call_latency_ms: 3000,
            max_call_latency_ms: 5000,
            explain_delay_ms: 2000,
            seed: 0,
        }
    }
}

/// Traffic condition resolution during tracking.
#[derive(Debug, Clone, Copy, Resource)]
pub struct TrafficConfig {
    /// Delay after tracking starts before the traffic condition resolves.
    pub check_delay_ms: u64,
    /// When set, the resolved level is forced instead of drawn at random.
    pub level_override: Option<TrafficLevel>,
    /// Heavy traffic imposes a delay uniform in [min, max] minutes.
    pub min_heavy_delay_minutes: u32,
    pub max_heavy_delay_minutes: u32,
    /// Moderate traffic imposes a delay uniform in [min, max] minutes.
    pub min_moderate_delay_minutes: u32,
    pub max_moderate_delay_minutes: u32,
    /// Probability that moderate traffic triggers a rerouting evaluation.
    pub moderate_reroute_probability: f64,
    /// Seed for RNG (for reproducibility).
    pub seed: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            check_delay_ms: 5000,
            level_override: None,
            min_heavy_delay_minutes: 5,
            max_heavy_delay_minutes: 12,
            min_moderate_delay_minutes: 2,
            max_moderate_delay_minutes: 5,
            moderate_reroute_probability: 0.5,
            seed: 0,
        }
    }
}

/// Rerouting evaluation behavior.
#[derive(Debug, Clone, Copy, Resource)]
pub struct RerouteConfig {
    /// Fixed "analysis" delay before the candidate unit is computed.
    pub analysis_delay_ms: u64,
    /// Candidate unit ETA is uniform in [min, max] minutes.
    pub min_candidate_eta_minutes: u32,
    pub max_candidate_eta_minutes: u32,
    /// Seed for RNG (for reproducibility).
    pub seed: u64,
}

impl Default for RerouteConfig {
    fn default() -> Self {
        Self {
            analysis_delay_ms: 3000,
            min_candidate_eta_minutes: 4,
            max_candidate_eta_minutes: 8,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Resource)]
pub struct TrackingConfig {
    /// Progress tick cadence (one tick per simulated second).
    pub tick_interval_ms: u64,
    /// Pause between arrival and session completion.
    pub arrival_settle_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            arrival_settle_ms: 2000,
        }
    }
}

/// Parameters for building a simulation world.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub speed_multiplier: f64,
    pub baseline_response_minutes: f64,
    /// Master seed fanned out to the per-concern seeds when set.
    pub seed: Option<u64>,
    pub countdown: CountdownConfig,
    pub negotiation: NegotiationConfig,
    pub traffic: TrafficConfig,
    pub reroute: RerouteConfig,
    pub tracking: TrackingConfig,
    pub routing_provider: RoutingProviderKind,
    /// Hospital list override; `None` uses the static Berlin fallback.
    pub hospitals: Option<Vec<Hospital>>,
    /// Requester position; `None` models denied/unavailable geolocation.
    pub requester_position: Option<Coordinates>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            baseline_response_minutes: 18.0,
            seed: None,
            countdown: CountdownConfig::default(),
            negotiation: NegotiationConfig::default(),
            traffic: TrafficConfig::default(),
            reroute: RerouteConfig::default(),
            tracking: TrackingConfig::default(),
            routing_provider: RoutingProviderKind::default(),
            hospitals: None,
            requester_position: Some(Coordinates::new(52.5200, 13.4050)),
        }
    }
}

impl SimulationParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_speed_multiplier(mut self, speed: f64) -> Self {
        self.speed_multiplier = speed;
        self
    }

    pub fn with_hospitals(mut self, hospitals: Vec<Hospital>) -> Self {
        self.hospitals = Some(hospitals);
        self
    }

    pub fn with_routing_provider(mut self, kind: RoutingProviderKind) -> Self {
        self.routing_provider = kind;
        self
    }

    pub fn with_requester_position(mut self, position: Coordinates) -> Self {
        self.requester_position = Some(position);
        self
    }

    /// Model a requester whose geolocation is unavailable; forces the
    /// distance-based ETA branch.
    pub fn without_geolocation(mut self) -> Self {
        self.requester_position = None;
        self
    }
}

/// Builds a fresh world with every resource the schedule needs.
pub fn build_world(params: &SimulationParams) -> World {
    let mut world = World::new();

    world.insert_resource(SimulationClock::default());
    world.insert_resource(SimulationSession::default());
    world.insert_resource(EventLog::default());
    world.insert_resource(StatisticsRecorder::default());
    world.insert_resource(SpeedMultiplier(params.speed_multiplier));
    world.insert_resource(BaselineResponse {
        minutes: params.baseline_response_minutes,
    });
    world.insert_resource(params.countdown);
    world.insert_resource(params.tracking);

    let mut negotiation = params.negotiation;
    let mut traffic = params.traffic;
    let mut reroute = params.reroute;
    if let Some(seed) = params.seed {
        negotiation.seed = seed;
        traffic.seed = seed.wrapping_add(1);
        reroute.seed = seed.wrapping_add(2);
    }
    world.insert_resource(negotiation);
    world.insert_resource(traffic);
    world.insert_resource(reroute);

    let directory: Box<dyn HospitalDirectory> = match &params.hospitals {
        Some(hospitals) => Box::new(StaticHospitalDirectory::new(hospitals.clone())),
        None => Box::new(StaticHospitalDirectory::berlin_defaults()),
    };
    world.insert_resource(HospitalDirectoryResource(directory));
    world.insert_resource(RoutingProviderResource(build_routing_provider(
        &params.routing_provider,
    )));

    let geolocation: Box<dyn GeolocationProvider> = match params.requester_position {
        Some(position) => Box::new(FixedGeolocation(position)),
        None => Box::new(NoGeolocation),
    };
    world.insert_resource(GeolocationResource(geolocation));

    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_multiplier_scales_and_floors() {
        let speed = SpeedMultiplier(4.0);
        assert_eq!(speed.scale_ms(1000), 250);
        assert_eq!(speed.scale_ms(1), 1);
        let realtime = SpeedMultiplier::default();
        assert_eq!(realtime.scale_ms(1000), 1000);
    }

    #[test]
    fn master_seed_fans_out() {
        let params = SimulationParams::default().with_seed(42);
        let world = build_world(&params);
        assert_eq!(world.resource::<NegotiationConfig>().seed, 42);
        assert_eq!(world.resource::<TrafficConfig>().seed, 43);
        assert_eq!(world.resource::<RerouteConfig>().seed, 44);
    }

    #[test]
    fn build_world_inserts_collaborators() {
        let world = build_world(&SimulationParams::default());
        assert!(!world
            .resource::<HospitalDirectoryResource>()
            .0
            .nearby()
            .is_empty());
        assert!(world.resource::<SimulationClock>().is_empty());
        assert!(!world.resource::<SimulationSession>().is_active());
    }
}
