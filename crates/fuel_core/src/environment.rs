use std::collections::VecDeque;

use crate::tanker::{advance_tanker, TankerTick};
use crate::{
    emit, select_dispatch_target, Constants, Counters, DestinationOutcome, EnvironmentSnapshot,
    Event, EventEnvelope, MetaState, RefuelCenter, RefuelCenterModel, Station, StationId,
    StationModel, Target, Tanker, TankerModel, TankerPhase,
};

/// Undrained events beyond this many are discarded, oldest first.
pub const MAX_BUFFERED_EVENTS: usize = 10_000;

/// The whole simulated world: stations, the refuel center, and the tanker.
///
/// Owned by whoever drives the simulation. Callers that share it across
/// threads must hold one lock around both [`Environment::update`] and
/// [`Environment::set_tanker_destination`].
#[derive(Debug, Clone)]
pub struct Environment {
    pub meta: MetaState,
    pub constants: Constants,
    pub stations: Vec<Station>,
    pub refuel_center: RefuelCenter,
    pub tanker: Tanker,
    pub counters: Counters,
    events: VecDeque<EventEnvelope>,
}

impl Environment {
    /// Empty world with the tanker parked, full, at the refuel center.
    pub fn new(constants: Constants, config_version: impl Into<String>) -> Self {
        assert!(
            constants.low_fuel_threshold > 0.0 && constants.low_fuel_threshold <= 1.0,
            "low_fuel_threshold must be in (0, 1], got {}",
            constants.low_fuel_threshold
        );
        let refuel_center = RefuelCenter::default();
        let tanker = Tanker::new(
            refuel_center.position,
            constants.tanker_capacity,
            constants.tanker_speed,
            constants.tanker_transfer_rate,
        );
        Self {
            meta: MetaState {
                tick: 0,
                config_version: config_version.into(),
            },
            constants,
            stations: Vec::new(),
            refuel_center,
            tanker,
            counters: Counters::default(),
            events: VecDeque::new(),
        }
    }

    /// Add a station. Setup-time only: panics once ticking has started or
    /// if the id is already taken.
    pub fn register_station(&mut self, station: Station) {
        assert!(
            self.meta.tick == 0,
            "station '{}' registered after the simulation started",
            station.id
        );
        assert!(
            self.station(&station.id).is_none(),
            "station '{}' registered twice",
            station.id
        );
        self.stations.push(station);
    }

    pub fn station(&self, id: &StationId) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == *id)
    }

    /// Advance the world by one tick.
    ///
    /// Order of operations:
    /// 1. Every station draws fuel for its vehicles.
    /// 2. An untargeted tanker is dispatched to the most critical station.
    /// 3. The tanker moves, transfers, or reloads.
    /// 4. Increment tick counter.
    ///
    /// Events produced along the way are buffered for [`Environment::drain_events`].
    /// Callers that never drain keep only the newest [`MAX_BUFFERED_EVENTS`].
    pub fn update(&mut self) {
        assert!(
            !self.stations.is_empty(),
            "environment has no registered stations"
        );
        let tick = self.meta.tick;

        self.consume_fuel(tick);
        if self.tanker.target.is_none() {
            self.dispatch_tanker(tick);
        }

        let mut ctx = TankerTick {
            stations: &mut self.stations,
            depot: &self.refuel_center,
            counters: &mut self.counters,
            tick,
            events: &mut self.events,
        };
        advance_tanker(&mut self.tanker, &mut ctx);

        self.meta.tick += 1;
        self.trim_events();
        self.check_invariants();
    }

    fn trim_events(&mut self) {
        let excess = self.events.len().saturating_sub(MAX_BUFFERED_EVENTS);
        self.events.drain(..excess);
    }

    fn consume_fuel(&mut self, tick: u64) {
        for station in &mut self.stations {
            let was_empty = station.is_empty();
            self.counters.fuel_consumed_total += station.consume(1);
            self.counters.fuel_lost_total += station.loss;
            if station.is_empty() && !was_empty {
                self.events.push_back(emit(
                    &mut self.counters,
                    tick,
                    Event::StationEmptied {
                        station_id: station.id.clone(),
                    },
                ));
            }
        }
    }

    fn dispatch_tanker(&mut self, tick: u64) {
        let Some(index) =
            select_dispatch_target(&self.stations, self.constants.low_fuel_threshold)
        else {
            return;
        };
        let station = &self.stations[index];
        self.tanker.target = Some(Target::Station(station.id.clone()));
        self.events.push_back(emit(
            &mut self.counters,
            tick,
            Event::TankerDispatched {
                station_id: station.id.clone(),
                fuel_ratio: station.fuel_ratio(),
            },
        ));
    }

    /// Point the tanker at `target`, replacing any automatic or queued choice.
    pub fn set_tanker_destination(&mut self, target: Target) {
        if let Target::Station(id) = &target {
            assert!(
                self.station(id).is_some(),
                "destination '{id}' is not a registered station"
            );
        }
        self.tanker.queued = None;
        self.tanker.target = Some(target.clone());
        self.events.push_back(emit(
            &mut self.counters,
            self.meta.tick,
            Event::DestinationOverridden { target },
        ));
        self.trim_events();
        self.check_invariants();
    }

    /// Station at `(x, y)` (within relative tolerance), else the refuel center
    /// when the coordinates are the origin.
    pub fn resolve_destination(&self, x: f64, y: f64) -> Option<Target> {
        if let Some(station) = self.stations.iter().find(|s| s.position.is_close(x, y)) {
            return Some(Target::Station(station.id.clone()));
        }
        if self.refuel_center.position.is_close(x, y) {
            return Some(Target::Depot);
        }
        None
    }

    /// Resolve coordinates and apply them as the tanker's destination.
    /// Unmatched coordinates leave the tanker untouched.
    pub fn set_tanker_destination_at(&mut self, x: f64, y: f64) -> DestinationOutcome {
        let Some(target) = self.resolve_destination(x, y) else {
            return DestinationOutcome::NotFound;
        };
        let outcome = match &target {
            Target::Station(id) => DestinationOutcome::Station(id.clone()),
            Target::Depot => DestinationOutcome::Depot,
        };
        self.set_tanker_destination(target);
        outcome
    }

    /// Events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain(..).collect()
    }

    /// Read-only view of the world for serialisation.
    pub fn state_as_model(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            tick: self.meta.tick,
            stations: self
                .stations
                .iter()
                .map(|station| StationModel {
                    id: station.id.clone(),
                    x: station.position.x,
                    y: station.position.y,
                    fuel_level: station.fuel_level,
                    fuel_capacity: station.fuel_capacity,
                    vehicle_count: station.vehicle_count(),
                    loss: station.loss,
                    loss_total: station.loss_total,
                })
                .collect(),
            tanker: TankerModel {
                x: self.tanker.position.x,
                y: self.tanker.position.y,
                fuel_payload: self.tanker.fuel_payload,
                capacity: self.tanker.capacity,
                phase: self.tanker.phase,
                target: self.tanker.target.as_ref().map(Target::label),
            },
            refuel_center: RefuelCenterModel {
                x: self.refuel_center.position.x,
                y: self.refuel_center.position.y,
            },
        }
    }

    /// Panics if any structural invariant is broken.
    pub fn check_invariants(&self) {
        for station in &self.stations {
            assert!(
                station.fuel_level >= 0.0 && station.fuel_level <= station.fuel_capacity,
                "station '{}' fuel_level {} outside [0, {}]",
                station.id,
                station.fuel_level,
                station.fuel_capacity,
            );
        }
        let tanker = &self.tanker;
        assert!(
            tanker.fuel_payload >= 0.0 && tanker.fuel_payload <= tanker.capacity,
            "tanker fuel_payload {} outside [0, {}]",
            tanker.fuel_payload,
            tanker.capacity,
        );
        for target in [&tanker.target, &tanker.queued].into_iter().flatten() {
            if let Target::Station(id) = target {
                assert!(
                    self.station(id).is_some(),
                    "tanker references unknown station '{id}'"
                );
            }
        }
        if tanker.target.is_none() {
            assert!(
                tanker.phase == TankerPhase::Idle,
                "tanker has no target but is {}",
                tanker.phase.as_str()
            );
        }
    }
}
