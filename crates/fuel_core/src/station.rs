//! Station fuel accounting: aggregate consumption and clamped deliveries.

use crate::{Position, Station, StationId, Vehicle};

impl Vehicle {
    pub fn new(tank_capacity: f64, consumption_rate: f64) -> Self {
        assert!(
            tank_capacity > 0.0,
            "vehicle tank_capacity must be positive, got {tank_capacity}"
        );
        assert!(
            consumption_rate > 0.0,
            "vehicle consumption_rate must be positive, got {consumption_rate}"
        );
        Self {
            tank_capacity,
            consumption_rate,
        }
    }
}

impl Station {
    /// A station starts with a full reservoir and no vehicles.
    pub fn new(id: StationId, position: Position, fuel_capacity: f64) -> Self {
        assert!(
            fuel_capacity > 0.0,
            "station '{id}' fuel_capacity must be positive, got {fuel_capacity}"
        );
        Self {
            id,
            position,
            fuel_capacity,
            fuel_level: fuel_capacity,
            loss: 0.0,
            loss_total: 0.0,
            vehicles: Vec::new(),
            consumption_per_tick: 0.0,
        }
    }

    pub fn with_fuel_level(mut self, fuel_level: f64) -> Self {
        assert!(
            (0.0..=self.fuel_capacity).contains(&fuel_level),
            "station '{}' fuel_level {fuel_level} outside [0, {}]",
            self.id,
            self.fuel_capacity,
        );
        self.fuel_level = fuel_level;
        self
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        self.consumption_per_tick += vehicle.consumption_rate;
        self.vehicles.push(vehicle);
    }

    pub fn add_vehicles(&mut self, vehicles: impl IntoIterator<Item = Vehicle>) {
        for vehicle in vehicles {
            self.add_vehicle(vehicle);
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn consumption_per_tick(&self) -> f64 {
        self.consumption_per_tick
    }

    /// Draw fuel for every vehicle over `ticks_elapsed` ticks, flooring at 0.
    ///
    /// Returns the amount actually drawn, which is less than the demand once
    /// the reservoir runs dry. The shortfall is recorded as `loss`.
    pub fn consume(&mut self, ticks_elapsed: u32) -> f64 {
        let demand = self.consumption_per_tick * f64::from(ticks_elapsed);
        let drawn = demand.min(self.fuel_level);
        self.fuel_level = (self.fuel_level - drawn).max(0.0);
        self.loss = (demand - drawn).max(0.0);
        self.loss_total += self.loss;
        drawn
    }

    /// Absorb up to `amount` of fuel, never past capacity.
    /// Returns the amount absorbed.
    pub fn receive(&mut self, amount: f64) -> f64 {
        let headroom = self.headroom();
        let absorbed = amount.min(headroom).max(0.0);
        if absorbed >= headroom {
            self.fuel_level = self.fuel_capacity;
        } else {
            self.fuel_level += absorbed;
        }
        absorbed
    }

    pub fn headroom(&self) -> f64 {
        (self.fuel_capacity - self.fuel_level).max(0.0)
    }

    pub fn fuel_ratio(&self) -> f64 {
        self.fuel_level / self.fuel_capacity
    }

    pub fn is_full(&self) -> bool {
        self.fuel_level >= self.fuel_capacity
    }

    pub fn is_empty(&self) -> bool {
        self.fuel_level <= 0.0
    }
}
