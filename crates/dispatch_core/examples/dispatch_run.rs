//! Runs one seeded dispatch session end to end and prints the event log and
//! final statistics.
//!
//! ```sh
//! RUST_LOG=info cargo run --example dispatch_run
//! ```

use dispatch_core::controller::SimulationController;
use dispatch_core::scenario::SimulationParams;
use dispatch_core::session::Urgency;

fn main() {
    env_logger::init();

    let params = SimulationParams::default()
        .with_seed(42)
        .with_speed_multiplier(10.0);
    let mut controller = SimulationController::new(params);

    controller.trigger(Urgency::High);
    let steps = controller.run_until_idle(10_000);
    println!("session finished after {steps} events\n");

    for entry in controller.event_log().entries() {
        println!("[{:>7} ms] {}", entry.timestamp_ms, entry.message);
    }

    if let Some(stats) = controller.statistics() {
        println!(
            "\nstatistics:\n{}",
            serde_json::to_string_pretty(stats).expect("statistics serialize")
        );
    } else {
        println!("\nsession did not complete (cancelled or no hospital available)");
    }
}
