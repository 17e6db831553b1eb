//! `fuel_core`: deterministic fuel-logistics simulation.
//!
//! Stations drain fuel to their parked vehicles every tick; a single tanker
//! shuttles between the refuel center at the origin and whichever station
//! is most critical. The core does no IO and never reads a clock; the world
//! advances only when [`Environment::update`] is called.

mod dispatch;
mod environment;
pub mod metrics;
mod station;
mod tanker;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use dispatch::select_dispatch_target;
pub use environment::{Environment, MAX_BUFFERED_EVENTS};
pub use metrics::{compute_metrics, MetricsFileWriter, MetricsSnapshot};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(test)]
mod tests;
