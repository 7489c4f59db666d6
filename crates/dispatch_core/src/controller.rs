//! Controller: the public surface of the simulation.
//!
//! Owns the [`World`] and the schedule, exposes the trigger/cancel/reset
//! commands and step-wise execution, and renders read-only display frames
//! for front ends. All stochastic behavior lives in the systems; the
//! controller only guards phase transitions that originate from outside.

use bevy_ecs::prelude::{Schedule, World};
use serde::Serialize;

use crate::clock::{EventKind, SimulationClock};
use crate::event_log::EventLog;
use crate::runner::{run_next_event, run_until_empty, simulation_schedule};
use crate::scenario::{build_world, CountdownConfig, SimulationParams, SpeedMultiplier, TrafficConfig};
use crate::session::{Phase, SimulationSession, TrafficLevel, Urgency};
use crate::statistics::{SimulationStatistics, StatisticsRecorder};

/// Number of trailing log lines included in a display frame.
pub const LOG_TAIL_LEN: usize = 8;

/// Read-only projection of the session for rendering; cheap to clone and
/// serializable for wire transports.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayFrame {
    pub phase: Phase,
    pub countdown_remaining: u32,
    pub eta_minutes: f64,
    pub progress_percent: f64,
    pub traffic_level: TrafficLevel,
    pub delay_minutes: u32,
    pub reroute_count: u32,
    pub log_tail: Vec<String>,
}

pub struct SimulationController {
    world: World,
    schedule: Schedule,
}

impl SimulationController {
    pub fn new(params: SimulationParams) -> Self {
        Self {
            world: build_world(&params),
            schedule: simulation_schedule(),
        }
    }

    /// Starts a new dispatch session. Rejected while a session is in
    /// progress (anything but `Idle`, including `Complete` until reset).
    pub fn trigger(&mut self, urgency: Urgency) -> bool {
        if self.world.resource::<SimulationSession>().is_active() {
            let phase = self.world.resource::<SimulationSession>().phase;
            log::warn!("trigger rejected, session already active in phase {phase:?}");
            return false;
        }

        let ticks = self.world.resource::<CountdownConfig>().ticks;
        let interval = self.world.resource::<CountdownConfig>().tick_interval_ms;
        let interval = self.world.resource::<SpeedMultiplier>().scale_ms(interval);
        let now = self.world.resource::<SimulationClock>().now();

        self.world.resource_mut::<EventLog>().clear();
        self.world.resource_mut::<StatisticsRecorder>().restart();

        {
            let mut session = self.world.resource_mut::<SimulationSession>();
            session.id += 1;
            session.phase = Phase::Countdown;
            session.urgency = urgency;
            session.started_at = Some(now);
            session.countdown_remaining = ticks;
        }
        self.world.resource_mut::<StatisticsRecorder>().mark_start(now);
        self.world.resource_mut::<EventLog>().append(
            now,
            format!("Emergency reported ({urgency} urgency), dispatch begins in {ticks}s"),
        );

        let generation = self.world.resource::<SimulationSession>().generation;
        self.world
            .resource_mut::<SimulationClock>()
            .schedule_in(interval, EventKind::CountdownTick, generation);
        true
    }

    /// Aborts the session. Only the countdown and tracking phases are
    /// cancellable; anywhere else this is a rejected no-op.
    pub fn cancel(&mut self) -> bool {
        let phase = self.world.resource::<SimulationSession>().phase;
        let message = match phase {
            Phase::Countdown => "Dispatch cancelled during countdown",
            Phase::Tracking => "Dispatch cancelled, ambulance recalled",
            _ => {
                log::warn!("cancel rejected in phase {phase:?}");
                return false;
            }
        };

        if phase == Phase::Tracking {
            if let Some(unit) = self
                .world
                .resource_mut::<SimulationSession>()
                .active_unit_mut()
            {
                unit.status = crate::session::UnitStatus::Cancelled;
            }
        }

        let now = self.world.resource::<SimulationClock>().now();
        self.world.resource_mut::<EventLog>().append(now, message);
        self.reset();
        true
    }

    /// Drops every pending event and returns the session to `Idle`. The event
    /// log survives until the next trigger so the cancellation remains
    /// visible.
    pub fn reset(&mut self) {
        self.world.resource_mut::<SimulationClock>().clear();
        self.world
            .resource_mut::<SimulationSession>()
            .reset_to_idle();
    }

    /// Forces the next traffic resolution to `level` and schedules an
    /// immediate check. Only meaningful while tracking.
    pub fn inject_traffic(&mut self, level: TrafficLevel) -> bool {
        if self.world.resource::<SimulationSession>().phase != Phase::Tracking {
            log::warn!("traffic injection ignored outside tracking");
            return false;
        }
        self.world.resource_mut::<TrafficConfig>().level_override = Some(level);
        let generation = self.world.resource::<SimulationSession>().generation;
        self.world
            .resource_mut::<SimulationClock>()
            .schedule_in(0, EventKind::TrafficCheck, generation);
        true
    }

    /// Executes the next pending event. Returns false once the clock drains.
    pub fn step(&mut self) -> bool {
        run_next_event(&mut self.world, &mut self.schedule)
    }

    /// Runs events until the clock drains or `max_steps` is hit. Returns the
    /// number of events consumed.
    pub fn run_until_idle(&mut self, max_steps: usize) -> usize {
        run_until_empty(&mut self.world, &mut self.schedule, max_steps)
    }

    /// Like [`run_until_idle`](Self::run_until_idle) but yields a display
    /// frame to `observer` after every event.
    pub fn run_until_idle_with<F>(&mut self, max_steps: usize, mut observer: F) -> usize
    where
        F: FnMut(&DisplayFrame),
    {
        let mut steps = 0;
        while steps < max_steps && run_next_event(&mut self.world, &mut self.schedule) {
            steps += 1;
            let frame = Self::snapshot_from(&self.world);
            observer(&frame);
        }
        steps
    }

    pub fn snapshot(&self) -> DisplayFrame {
        Self::snapshot_from(&self.world)
    }

    fn snapshot_from(world: &World) -> DisplayFrame {
        let session = world.resource::<SimulationSession>();
        let log = world.resource::<EventLog>();
        DisplayFrame {
            phase: session.phase,
            countdown_remaining: session.countdown_remaining,
            eta_minutes: session.eta_minutes,
            progress_percent: session.progress_percent,
            traffic_level: session.traffic_level,
            delay_minutes: session.delay_minutes,
            reroute_count: session.reroute_count,
            log_tail: log
                .tail(LOG_TAIL_LEN)
                .iter()
                .map(|entry| entry.message.clone())
                .collect(),
        }
    }

    pub fn session(&self) -> &SimulationSession {
        self.world.resource::<SimulationSession>()
    }

    pub fn event_log(&self) -> &EventLog {
        self.world.resource::<EventLog>()
    }

    pub fn statistics(&self) -> Option<&SimulationStatistics> {
        self.world.resource::<StatisticsRecorder>().statistics()
    }

    pub fn pending_events(&self) -> usize {
        self.world.resource::<SimulationClock>().len()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
