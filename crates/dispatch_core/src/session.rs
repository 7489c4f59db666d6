//! Session state: the single authoritative record of an in-flight dispatch
//! simulation.
//!
//! Exactly one session may be active at a time; `phase == Idle` is the only
//! "not in progress" value. The session also carries the generation counter
//! that serves as the cancellation token for scheduled events.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hospitals::Hospital;

/// Top-level state machine:
/// `idle -> countdown -> calling -> dispatch -> tracking -> complete`,
/// with cancel edges from `countdown` and `tracking` back to `idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Countdown,
    Calling,
    Dispatch,
    Tracking,
    Complete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    High,
    #[default]
    Medium,
    Low,
}

impl Urgency {
    /// Probability that an answered hospital approves the dispatch request.
    pub fn approval_probability(self) -> f64 {
        match self {
            Urgency::High => 0.9,
            Urgency::Medium => 0.8,
            Urgency::Low => 0.7,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficLevel {
    #[default]
    Light,
    Moderate,
    Heavy,
}

impl TrafficLevel {
    /// Multiplier applied to the distance-based fallback ETA.
    pub fn multiplier(self) -> f64 {
        match self {
            TrafficLevel::Light => 1.0,
            TrafficLevel::Moderate => 1.3,
            TrafficLevel::Heavy => 1.8,
        }
    }
}

impl fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrafficLevel::Light => "light",
            TrafficLevel::Moderate => "moderate",
            TrafficLevel::Heavy => "heavy",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    Dispatched,
    Cancelled,
    Arrived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchUnit {
    pub id: String,
    pub origin_facility: String,
    pub eta_minutes: f64,
    pub status: UnitStatus,
}

/// Derived view of trip progress; not stored independently of the session.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteProgress {
    pub total_eta_seconds: f64,
    pub elapsed_seconds: f64,
    pub percent_complete: f64,
}

const MILESTONE_THRESHOLDS: [f64; 3] = [25.0, 50.0, 75.0];

#[derive(Debug, Resource)]
pub struct SimulationSession {
    pub id: u64,
    /// Cancellation token. Bumped on every reset; events carrying a stale
    /// generation are dropped before they can mutate the session.
    pub generation: u64,
    pub phase: Phase,
    pub urgency: Urgency,
    pub started_at: Option<u64>,
    pub ended_at: Option<u64>,
    pub countdown_remaining: u32,
    pub call_answered: bool,
    pub selected_hospital: Option<Hospital>,
    pub primary_unit: Option<DispatchUnit>,
    pub backup_unit: Option<DispatchUnit>,
    pub traffic_level: TrafficLevel,
    pub delay_minutes: u32,
    /// Active ETA in minutes. Traffic delays are folded in as they occur.
    pub eta_minutes: f64,
    pub progress_percent: f64,
    pub reroute_count: u32,
    milestones_emitted: u8,
    rng_draws: u64,
    unit_seq: u32,
}

impl Default for SimulationSession {
    fn default() -> Self {
        Self {
            id: 0,
            generation: 0,
            phase: Phase::Idle,
            urgency: Urgency::default(),
            started_at: None,
            ended_at: None,
            countdown_remaining: 0,
            call_answered: false,
            selected_hospital: None,
            primary_unit: None,
            backup_unit: None,
            traffic_level: TrafficLevel::default(),
            delay_minutes: 0,
            eta_minutes: 0.0,
            progress_percent: 0.0,
            reroute_count: 0,
            milestones_emitted: 0,
            rng_draws: 0,
            unit_seq: 0,
        }
    }
}

impl SimulationSession {
    /// `Idle` is the only "not in progress" phase; `Complete` still counts as
    /// active until the session is acknowledged via reset.
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Advances progress monotonically, clamped to [current, 100].
    pub fn advance_progress(&mut self, increment: f64) {
        let next = self.progress_percent + increment.max(0.0);
        self.progress_percent = next.min(100.0);
    }

    /// Claims the milestone at `index` (0 => 25%, 1 => 50%, 2 => 75%).
    /// Returns true only the first time, so overlapping ticks cannot emit a
    /// milestone twice.
    pub fn claim_milestone(&mut self, index: usize) -> bool {
        debug_assert!(index < MILESTONE_THRESHOLDS.len());
        let bit = 1u8 << index;
        if self.milestones_emitted & bit != 0 {
            return false;
        }
        self.milestones_emitted |= bit;
        true
    }

    /// Milestone thresholds newly crossed at the current progress value.
    pub fn newly_crossed_milestones(&mut self) -> Vec<u32> {
        let progress = self.progress_percent;
        let mut crossed = Vec::new();
        for (index, threshold) in MILESTONE_THRESHOLDS.iter().enumerate() {
            if progress >= *threshold && self.claim_milestone(index) {
                crossed.push(*threshold as u32);
            }
        }
        crossed
    }

    /// Monotone per-decision salt for the seeded RNG idiom.
    pub fn next_draw(&mut self) -> u64 {
        let draw = self.rng_draws;
        self.rng_draws += 1;
        draw
    }

    pub fn next_unit_id(&mut self) -> String {
        self.unit_seq += 1;
        format!("UNIT-{}", self.unit_seq)
    }

    /// The unit currently on the way: the backup if a reroute promoted one,
    /// otherwise the primary.
    pub fn active_unit(&self) -> Option<&DispatchUnit> {
        self.backup_unit.as_ref().or(self.primary_unit.as_ref())
    }

    pub fn active_unit_mut(&mut self) -> Option<&mut DispatchUnit> {
        self.backup_unit.as_mut().or(self.primary_unit.as_mut())
    }

    pub fn route_progress(&self) -> RouteProgress {
        let total = self.eta_minutes * 60.0;
        RouteProgress {
            total_eta_seconds: total,
            elapsed_seconds: total * self.progress_percent / 100.0,
            percent_complete: self.progress_percent,
        }
    }

    /// Returns every field to its default and invalidates the cancellation
    /// token. The session id survives so log readers can tell runs apart.
    pub fn reset_to_idle(&mut self) {
        let id = self.id;
        let generation = self.generation;
        *self = Self::default();
        self.id = id;
        self.generation = generation + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotone_and_clamped() {
        let mut session = SimulationSession::default();
        session.advance_progress(40.0);
        assert_eq!(session.progress_percent, 40.0);
        session.advance_progress(-10.0);
        assert_eq!(session.progress_percent, 40.0);
        session.advance_progress(90.0);
        assert_eq!(session.progress_percent, 100.0);
    }

    #[test]
    fn milestones_claimed_exactly_once() {
        let mut session = SimulationSession::default();
        session.advance_progress(60.0);
        assert_eq!(session.newly_crossed_milestones(), vec![25, 50]);
        assert_eq!(session.newly_crossed_milestones(), Vec::<u32>::new());
        session.advance_progress(40.0);
        assert_eq!(session.newly_crossed_milestones(), vec![75]);
    }

    #[test]
    fn reset_bumps_generation_and_returns_to_idle() {
        let mut session = SimulationSession::default();
        session.id = 3;
        session.phase = Phase::Tracking;
        session.eta_minutes = 12.0;
        let generation = session.generation;

        session.reset_to_idle();
        assert_eq!(session.phase, Phase::Idle);
        assert!(!session.is_active());
        assert_eq!(session.generation, generation + 1);
        assert_eq!(session.id, 3);
        assert_eq!(session.eta_minutes, 0.0);
    }

    #[test]
    fn approval_probability_tracks_urgency() {
        assert_eq!(Urgency::High.approval_probability(), 0.9);
        assert_eq!(Urgency::Medium.approval_probability(), 0.8);
        assert_eq!(Urgency::Low.approval_probability(), 0.7);
    }

    #[test]
    fn traffic_multipliers() {
        assert_eq!(TrafficLevel::Light.multiplier(), 1.0);
        assert_eq!(TrafficLevel::Moderate.multiplier(), 1.3);
        assert_eq!(TrafficLevel::Heavy.multiplier(), 1.8);
    }

    #[test]
    fn active_unit_prefers_backup() {
        let mut session = SimulationSession::default();
        session.primary_unit = Some(DispatchUnit {
            id: "UNIT-1".to_string(),
            origin_facility: "a".to_string(),
            eta_minutes: 10.0,
            status: UnitStatus::Cancelled,
        });
        assert_eq!(session.active_unit().expect("unit").id, "UNIT-1");
        session.backup_unit = Some(DispatchUnit {
            id: "UNIT-2".to_string(),
            origin_facility: "b".to_string(),
            eta_minutes: 5.0,
            status: UnitStatus::Dispatched,
        });
        assert_eq!(session.active_unit().expect("unit").id, "UNIT-2");
    }
}
