use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dispatch_core::controller::SimulationController;
use dispatch_core::scenario::SimulationParams;
use dispatch_core::session::{TrafficLevel, Urgency};

fn pinned_params(seed: u64) -> SimulationParams {
    let mut params = SimulationParams::default().with_seed(seed);
    params.negotiation.answer_probability = 1.0;
    params.negotiation.approval_override = Some(1.0);
    params.traffic.level_override = Some(TrafficLevel::Light);
    params
}

fn bench_full_session(c: &mut Criterion) {
    c.bench_function("full_dispatch_session", |b| {
        b.iter(|| {
            let mut controller = SimulationController::new(pinned_params(42));
            controller.trigger(Urgency::High);
            let steps = controller.run_until_idle(10_000);
            black_box(steps);
        })
    });
}

fn bench_trigger_cancel_cycle(c: &mut Criterion) {
    c.bench_function("trigger_cancel_cycle", |b| {
        let mut controller = SimulationController::new(pinned_params(42));
        b.iter(|| {
            controller.trigger(Urgency::Medium);
            controller.step();
            controller.cancel();
            black_box(controller.pending_events());
        })
    });
}

criterion_group!(benches, bench_full_session, bench_trigger_cancel_cycle);
criterion_main!(benches);
