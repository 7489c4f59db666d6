//! Session statistics: start/end capture, ETA evolution, derived KPIs.
//!
//! The recorder accumulates while the session runs and is finalized exactly
//! once at completion; the resulting [`SimulationStatistics`] is immutable.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::clock::ONE_SEC_MS;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationStatistics {
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    pub total_duration_seconds: f64,
    pub original_eta_minutes: f64,
    pub final_eta_minutes: f64,
    pub traffic_delay_minutes: u32,
    pub reroute_count: u32,
    pub hospital_name: String,
    pub unit_id: String,
    /// `max(0, baseline - finalETA)` against the externally supplied baseline
    /// response time.
    pub time_saved_minutes: f64,
}

#[derive(Debug, Default, Resource)]
pub struct StatisticsRecorder {
    start_time_ms: Option<u64>,
    original_eta_minutes: Option<f64>,
    traffic_delay_minutes: u32,
    finalized: Option<SimulationStatistics>,
}

impl StatisticsRecorder {
    /// Clears everything for a fresh session, so `mark_start` is honoured
    /// exactly once per session lifetime.
    pub fn restart(&mut self) {
        *self = Self::default();
    }

    pub fn mark_start(&mut self, now_ms: u64) {
        if self.start_time_ms.is_none() {
            self.start_time_ms = Some(now_ms);
        }
    }

    pub fn start_time_ms(&self) -> Option<u64> {
        self.start_time_ms
    }

    /// Records the first computed trip ETA; later calls are ignored.
    pub fn record_original_eta(&mut self, eta_minutes: f64) {
        if self.original_eta_minutes.is_none() {
            self.original_eta_minutes = Some(eta_minutes);
        }
    }

    pub fn original_eta_minutes(&self) -> Option<f64> {
        self.original_eta_minutes
    }

    pub fn add_traffic_delay(&mut self, minutes: u32) {
        self.traffic_delay_minutes += minutes;
    }

    pub fn traffic_delay_minutes(&self) -> u32 {
        self.traffic_delay_minutes
    }

    /// Finalizes once; subsequent calls return the already-frozen statistics
    /// unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn finalize(
        &mut self,
        end_time_ms: u64,
        final_eta_minutes: f64,
        reroute_count: u32,
        hospital_name: String,
        unit_id: String,
        baseline_minutes: f64,
    ) -> &SimulationStatistics {
        if self.finalized.is_none() {
            let start_time_ms = self.start_time_ms.unwrap_or(end_time_ms);
            let total_duration_seconds =
                end_time_ms.saturating_sub(start_time_ms) as f64 / ONE_SEC_MS as f64;
            self.finalized = Some(SimulationStatistics {
                start_time_ms,
                end_time_ms,
                total_duration_seconds,
                original_eta_minutes: self.original_eta_minutes.unwrap_or(final_eta_minutes),
                final_eta_minutes,
                traffic_delay_minutes: self.traffic_delay_minutes,
                reroute_count,
                hospital_name,
                unit_id,
                time_saved_minutes: (baseline_minutes - final_eta_minutes).max(0.0),
            });
        }
        self.finalized.as_ref().expect("finalized above")
    }

    pub fn statistics(&self) -> Option<&SimulationStatistics> {
        self.finalized.as_ref()
    }
}
