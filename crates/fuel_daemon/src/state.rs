use crate::alerts::AlertEngine;
use fuel_core::{DestinationOutcome, Environment, EventEnvelope, MetricsSnapshot};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Oldest samples are dropped beyond this many.
pub const METRICS_HISTORY_LIMIT: usize = 10_000;

pub struct SimState {
    pub env: Environment,
    pub metrics_history: VecDeque<MetricsSnapshot>,
    pub metrics_every: u64,
    pub alert_engine: AlertEngine,
}

impl SimState {
    pub fn new(env: Environment, metrics_every: u64) -> Self {
        assert!(metrics_every > 0, "metrics_every must be at least 1");
        Self {
            env,
            metrics_history: VecDeque::new(),
            metrics_every,
            alert_engine: AlertEngine::new(),
        }
    }

    pub fn push_metrics(&mut self, snapshot: MetricsSnapshot) {
        if self.metrics_history.len() >= METRICS_HISTORY_LIMIT {
            self.metrics_history.pop_front();
        }
        self.metrics_history.push_back(snapshot);
    }

    /// Advance one tick. Returns the tick's events followed by any alert
    /// transitions from the metrics sample taken after it.
    pub fn step(&mut self) -> Vec<EventEnvelope> {
        self.env.update();
        let mut events = self.env.drain_events();

        let tick = self.env.meta.tick;
        if tick % self.metrics_every == 0 {
            self.push_metrics(fuel_core::compute_metrics(&self.env));
            events.extend(self.alert_engine.evaluate(
                &self.metrics_history,
                tick,
                &mut self.env.counters,
            ));
        }
        events
    }

    pub fn set_destination(&mut self, x: f64, y: f64) -> (DestinationOutcome, Vec<EventEnvelope>) {
        let outcome = self.env.set_tanker_destination_at(x, y);
        (outcome, self.env.drain_events())
    }
}

pub type SharedSim = Arc<parking_lot::Mutex<SimState>>;
pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

#[derive(Clone)]
pub struct AppState {
    pub sim: SharedSim,
    pub event_tx: EventTx,
}
