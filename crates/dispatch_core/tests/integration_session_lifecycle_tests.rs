//! End-to-end lifecycle coverage: trigger, cancel, duplicate commands and the
//! full run through completion.

use dispatch_core::controller::SimulationController;
use dispatch_core::scenario::SimulationParams;
use dispatch_core::session::{Phase, TrafficLevel, Urgency};

const MAX_STEPS: usize = 5000;

/// A parameter set with every stochastic branch pinned, so a session always
/// runs trigger -> countdown -> call answered -> approved -> tracking ->
/// complete.
fn pinned_params(seed: u64) -> SimulationParams {
    let mut params = SimulationParams::default().with_seed(seed);
    params.negotiation.answer_probability = 1.0;
    params.negotiation.approval_override = Some(1.0);
    params.traffic.level_override = Some(TrafficLevel::Light);
    params
}

fn step_until_phase(controller: &mut SimulationController, phase: Phase) {
    let mut steps = 0;
    while controller.session().phase != phase {
        assert!(controller.step(), "clock drained before reaching {phase:?}");
        steps += 1;
        assert!(steps < MAX_STEPS, "no progress toward {phase:?}");
    }
}

#[test]
fn cancel_during_countdown_returns_to_idle_for_every_urgency() {
    for urgency in [Urgency::High, Urgency::Medium, Urgency::Low] {
        let mut controller = SimulationController::new(pinned_params(7));
        assert!(controller.trigger(urgency));
        controller.step();
        controller.step();

        assert!(controller.cancel());
        assert_eq!(controller.session().phase, Phase::Idle);
        assert_eq!(controller.pending_events(), 0);
        assert!(controller
            .event_log()
            .contains("Dispatch cancelled during countdown"));
    }
}

#[test]
fn duplicate_trigger_is_a_silent_no_op() {
    let mut controller = SimulationController::new(pinned_params(7));
    assert!(controller.trigger(Urgency::High));
    controller.step();

    let log_len = controller.event_log().len();
    let pending = controller.pending_events();
    assert!(!controller.trigger(Urgency::Low));

    assert_eq!(controller.event_log().len(), log_len);
    assert_eq!(controller.pending_events(), pending);
    assert_eq!(controller.session().phase, Phase::Countdown);
    assert_eq!(controller.session().urgency, Urgency::High);
}

#[test]
fn cancel_is_rejected_during_negotiation_and_session_still_completes() {
    let mut controller = SimulationController::new(pinned_params(3));
    assert!(controller.trigger(Urgency::Medium));
    step_until_phase(&mut controller, Phase::Calling);

    let log_len = controller.event_log().len();
    assert!(!controller.cancel());
    assert_eq!(controller.event_log().len(), log_len);
    assert_eq!(controller.session().phase, Phase::Calling);

    controller.run_until_idle(MAX_STEPS);
    assert_eq!(controller.session().phase, Phase::Complete);
    assert!(controller.statistics().is_some());
}

#[test]
fn full_session_produces_frozen_statistics() {
    let mut controller = SimulationController::new(pinned_params(11));
    assert!(controller.trigger(Urgency::High));
    controller.run_until_idle(MAX_STEPS);

    let session = controller.session();
    assert_eq!(session.phase, Phase::Complete);
    assert_eq!(session.progress_percent, 100.0);
    assert!(session.ended_at.is_some());

    let stats = controller.statistics().expect("statistics after completion");
    assert!(stats.total_duration_seconds > 0.0);
    assert!(stats.final_eta_minutes > 0.0);
    assert_eq!(stats.traffic_delay_minutes, 0);
    assert!(!stats.hospital_name.is_empty());
    assert!(!stats.unit_id.is_empty());
    assert!(controller.event_log().contains("Dispatch complete"));
}

#[test]
fn completed_session_blocks_trigger_until_reset() {
    let mut controller = SimulationController::new(pinned_params(11));
    controller.trigger(Urgency::High);
    controller.run_until_idle(MAX_STEPS);
    assert_eq!(controller.session().phase, Phase::Complete);

    assert!(!controller.trigger(Urgency::Low));

    controller.reset();
    assert_eq!(controller.session().phase, Phase::Idle);
    assert!(controller.trigger(Urgency::Low));
    assert_eq!(controller.session().id, 2);
    // The new trigger starts a fresh log.
    assert_eq!(controller.event_log().len(), 1);
}

#[test]
fn cancel_during_tracking_recalls_the_unit() {
    let mut controller = SimulationController::new(pinned_params(5));
    controller.trigger(Urgency::High);
    step_until_phase(&mut controller, Phase::Tracking);

    assert!(controller.cancel());
    assert_eq!(controller.session().phase, Phase::Idle);
    assert_eq!(controller.pending_events(), 0);
    assert!(controller
        .event_log()
        .contains("Dispatch cancelled, ambulance recalled"));
}
