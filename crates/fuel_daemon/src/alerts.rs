use fuel_core::MetricsSnapshot;
use std::collections::{BTreeSet, VecDeque};

type RuleFn = fn(&VecDeque<MetricsSnapshot>) -> bool;

struct AlertRule {
    id: &'static str,
    severity: fuel_core::AlertSeverity,
    check: RuleFn,
    message: &'static str,
    suggested_action: &'static str,
}

const RULES: &[AlertRule] = &[
    AlertRule {
        id: "STATION_DRY",
        severity: fuel_core::AlertSeverity::Critical,
        check: |h| latest(h).is_some_and(|s| s.stations_empty > 0),
        message: "A station has run out of fuel",
        suggested_action: "Redirect the tanker to the empty station",
    },
    AlertRule {
        id: "LOW_FUEL_BACKLOG",
        severity: fuel_core::AlertSeverity::Warning,
        check: |h| h.len() >= 3 && tail(h, 3).iter().all(|s| s.stations_low >= 2),
        message: "Two or more stations below the low-fuel threshold for 3+ samples",
        suggested_action: "Single tanker cannot keep up; prioritise the lowest stations manually",
    },
    AlertRule {
        id: "NETWORK_DRAINING",
        severity: fuel_core::AlertSeverity::Warning,
        check: |h| {
            let recent = tail(h, 10);
            if recent.len() < 10 {
                return false;
            }
            // `tail` is newest first.
            let newest = recent[0];
            let oldest = recent[recent.len() - 1];
            newest.total_station_fuel < oldest.total_station_fuel && newest.avg_fuel_ratio < 0.5
        },
        message: "Total station fuel falling while the network is under half full",
        suggested_action: "Check that the tanker is delivering rather than idling",
    },
];

// --- Helpers for querying recent snapshots ---

fn latest(h: &VecDeque<MetricsSnapshot>) -> Option<&MetricsSnapshot> {
    h.back()
}

fn tail(h: &VecDeque<MetricsSnapshot>, n: usize) -> Vec<&MetricsSnapshot> {
    h.iter().rev().take(n).collect()
}

// --- AlertEngine ---

#[derive(Default)]
pub struct AlertEngine {
    active: BTreeSet<&'static str>,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns current active alert IDs (for the /api/v1/alerts endpoint).
    pub fn active_alert_ids(&self) -> Vec<String> {
        self.active.iter().map(|id| (*id).to_string()).collect()
    }

    /// Evaluate all rules against recent metrics history. Returns events for state changes.
    pub fn evaluate(
        &mut self,
        history: &VecDeque<MetricsSnapshot>,
        tick: u64,
        counters: &mut fuel_core::Counters,
    ) -> Vec<fuel_core::EventEnvelope> {
        let mut events = Vec::new();

        for rule in RULES {
            let fired = (rule.check)(history);
            let was_active = self.active.contains(rule.id);

            if fired && !was_active {
                self.active.insert(rule.id);
                events.push(make_envelope(
                    counters,
                    tick,
                    fuel_core::Event::AlertRaised {
                        alert_id: rule.id.to_string(),
                        severity: rule.severity.clone(),
                        message: rule.message.to_string(),
                        suggested_action: rule.suggested_action.to_string(),
                    },
                ));
            } else if !fired && was_active {
                self.active.remove(rule.id);
                events.push(make_envelope(
                    counters,
                    tick,
                    fuel_core::Event::AlertCleared {
                        alert_id: rule.id.to_string(),
                    },
                ));
            }
        }

        events
    }
}

fn make_envelope(
    counters: &mut fuel_core::Counters,
    tick: u64,
    event: fuel_core::Event,
) -> fuel_core::EventEnvelope {
    let id = fuel_core::EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    fuel_core::EventEnvelope { id, tick, event }
}
