use super::*;
use crate::test_fixtures::{base_constants, reference_env, station_with_vehicles, two_station_env};

mod dispatch;
mod tanker;

// --- Shared test helpers ------------------------------------------------

fn station_a() -> StationId {
    StationId("station_a".to_string())
}

fn station_b() -> StationId {
    StationId("station_b".to_string())
}

fn run_ticks(env: &mut Environment, ticks: u64) {
    for _ in 0..ticks {
        env.update();
    }
}

/// Step until `done` holds, returning the number of updates taken.
fn run_until(env: &mut Environment, max_ticks: u64, done: impl Fn(&Environment) -> bool) -> u64 {
    for taken in 1..=max_ticks {
        env.update();
        if done(env) {
            return taken;
        }
    }
    panic!("condition not reached within {max_ticks} ticks");
}

fn bits_eq(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}
