pub mod completion;
pub mod countdown;
pub mod negotiation;
pub mod reroute;
pub mod tracking;
pub mod traffic;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded per-decision RNG: the same config seed plus the session's draw
/// counter reproduces every stochastic outcome exactly.
pub(crate) fn decision_rng(seed: u64, draw: u64) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(draw))
}
