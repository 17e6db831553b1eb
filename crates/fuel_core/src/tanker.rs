//! Tanker movement, fuel transfer, and the per-tick routing state machine.
//!
//! ```text
//! Idle -> EnRouteToStation -> DockedTransferring -> EnRouteToDepot -> DockedReloading -> Idle
//! ```
//!
//! Arrival and the first transfer (or reload) happen in the same tick. A
//! station target assigned while the tank is empty is parked in `queued`
//! and picked up again once the tanker leaves the depot full.

use std::collections::VecDeque;

use crate::{
    emit, Counters, Event, EventEnvelope, Position, RefuelCenter, Station, Target, Tanker,
    TankerPhase,
};

/// Positions closer than this count as docked.
const DOCKING_TOLERANCE: f64 = 1e-9;

impl Tanker {
    /// A tanker parked at `position` with a full payload and no target.
    pub fn new(position: Position, capacity: f64, speed: f64, transfer_rate: f64) -> Self {
        assert!(capacity > 0.0, "tanker capacity must be positive, got {capacity}");
        assert!(speed > 0.0, "tanker speed must be positive, got {speed}");
        assert!(
            transfer_rate > 0.0,
            "tanker transfer_rate must be positive, got {transfer_rate}"
        );
        Self {
            position,
            fuel_payload: capacity,
            capacity,
            speed,
            transfer_rate,
            target: None,
            queued: None,
            phase: TankerPhase::Idle,
        }
    }

    /// Straight-line move of at most `max_distance`. Snaps onto `target` and
    /// returns `true` when it is within reach.
    pub fn move_toward(&mut self, target: Position, max_distance: f64) -> bool {
        let distance = self.position.distance_to(target);
        if distance <= max_distance {
            self.position = target;
            return true;
        }
        let step = max_distance / distance;
        self.position = Position::new(
            self.position.x + (target.x - self.position.x) * step,
            self.position.y + (target.y - self.position.y) * step,
        );
        false
    }

    pub fn is_at(&self, position: Position) -> bool {
        self.position.distance_to(position) <= DOCKING_TOLERANCE
    }

    /// Move `min(payload, rate * ticks, station headroom)` into the station.
    /// Returns the amount moved; the tanker loses exactly what the station gains.
    pub fn dock_and_transfer(&mut self, station: &mut Station, ticks_elapsed: u32) -> f64 {
        assert!(
            self.is_at(station.position),
            "tanker must be docked at '{}' to transfer fuel",
            station.id
        );
        let amount = self
            .fuel_payload
            .min(self.transfer_rate * f64::from(ticks_elapsed))
            .min(station.headroom());
        let moved = station.receive(amount);
        self.fuel_payload = (self.fuel_payload - moved).max(0.0);
        moved
    }

    /// Take on `rate * ticks` of fuel at the depot, clamped to capacity.
    /// Returns the amount loaded.
    pub fn reload(&mut self, depot: &RefuelCenter, ticks_elapsed: u32) -> f64 {
        assert!(
            self.is_at(depot.position),
            "tanker must be docked at the refuel center to reload"
        );
        let headroom = (self.capacity - self.fuel_payload).max(0.0);
        let loaded = (self.transfer_rate * f64::from(ticks_elapsed)).min(headroom);
        if loaded >= headroom {
            self.fuel_payload = self.capacity;
        } else {
            self.fuel_payload += loaded;
        }
        loaded
    }

    pub fn is_full(&self) -> bool {
        self.fuel_payload >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.fuel_payload <= 0.0
    }
}

/// Mutable view of everything a tanker tick touches.
pub(crate) struct TankerTick<'a> {
    pub stations: &'a mut [Station],
    pub depot: &'a RefuelCenter,
    pub counters: &'a mut Counters,
    pub tick: u64,
    pub events: &'a mut VecDeque<EventEnvelope>,
}

/// Advance the tanker one tick along its state machine.
pub(crate) fn advance_tanker(tanker: &mut Tanker, ctx: &mut TankerTick<'_>) {
    match tanker.target.clone() {
        None => tanker.phase = TankerPhase::Idle,
        Some(Target::Depot) => service_depot(tanker, ctx),
        Some(Target::Station(station_id)) => {
            if tanker.is_empty() {
                tanker.queued = Some(Target::Station(station_id));
                tanker.target = Some(Target::Depot);
                service_depot(tanker, ctx);
                return;
            }
            let Some(station) = ctx.stations.iter_mut().find(|s| s.id == station_id) else {
                panic!("tanker target '{station_id}' is not a registered station");
            };
            let already_docked =
                tanker.phase == TankerPhase::DockedTransferring && tanker.is_at(station.position);
            if !tanker.move_toward(station.position, tanker.speed) {
                tanker.phase = TankerPhase::EnRouteToStation;
                return;
            }
            if !already_docked {
                ctx.events.push_back(emit(
                    ctx.counters,
                    ctx.tick,
                    Event::TankerArrived {
                        target: Target::Station(station_id.clone()),
                    },
                ));
            }
            tanker.phase = TankerPhase::DockedTransferring;

            let moved = tanker.dock_and_transfer(station, 1);
            if moved > 0.0 {
                ctx.counters.fuel_delivered_total += moved;
                ctx.events.push_back(emit(
                    ctx.counters,
                    ctx.tick,
                    Event::FuelDelivered {
                        station_id,
                        amount: moved,
                    },
                ));
            }
            if tanker.is_empty() || station.is_full() {
                tanker.target = Some(Target::Depot);
                tanker.phase = TankerPhase::EnRouteToDepot;
            }
        }
    }
}

fn service_depot(tanker: &mut Tanker, ctx: &mut TankerTick<'_>) {
    if !tanker.move_toward(ctx.depot.position, tanker.speed) {
        tanker.phase = TankerPhase::EnRouteToDepot;
        return;
    }
    if tanker.phase != TankerPhase::DockedReloading {
        ctx.events.push_back(emit(
            ctx.counters,
            ctx.tick,
            Event::TankerArrived {
                target: Target::Depot,
            },
        ));
    }
    tanker.phase = TankerPhase::DockedReloading;

    ctx.counters.fuel_loaded_total += tanker.reload(ctx.depot, 1);
    if tanker.is_full() {
        ctx.events.push_back(emit(
            ctx.counters,
            ctx.tick,
            Event::TankerReloaded {
                payload: tanker.fuel_payload,
            },
        ));
        tanker.target = tanker.queued.take();
        tanker.phase = if tanker.target.is_some() {
            TankerPhase::EnRouteToStation
        } else {
            TankerPhase::Idle
        };
    }
}
