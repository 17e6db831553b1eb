//! Shared test fixtures for `fuel_core` and downstream crates.
//!
//! `two_station_env()` is a small hand-checkable world. `reference_env()`
//! reproduces the seven-station layout used by the shipped world config.

use crate::{Constants, Environment, Position, Station, StationId, Vehicle};

/// Threshold 0.25, capacity 1000, speed 5, transfer rate 50.
pub fn base_constants() -> Constants {
    Constants {
        low_fuel_threshold: 0.25,
        tanker_capacity: 1000.0,
        tanker_speed: 5.0,
        tanker_transfer_rate: 50.0,
    }
}

/// Full station with `count` identical vehicles (tank capacity 33).
pub fn station_with_vehicles(
    id: &str,
    position: Position,
    fuel_capacity: f64,
    count: usize,
    consumption_rate: f64,
) -> Station {
    let mut station = Station::new(StationId(id.to_string()), position, fuel_capacity);
    station.add_vehicles((0..count).map(|_| Vehicle::new(33.0, consumption_rate)));
    station
}

/// `station_a` at (10, 0) draining 10/tick, `station_b` at (0, 20) draining 5/tick.
pub fn two_station_env() -> Environment {
    let mut env = Environment::new(base_constants(), "test");
    env.register_station(station_with_vehicles(
        "station_a",
        Position::new(10.0, 0.0),
        400.0,
        2,
        5.0,
    ));
    env.register_station(station_with_vehicles(
        "station_b",
        Position::new(0.0, 20.0),
        500.0,
        1,
        5.0,
    ));
    env
}

/// Seven stations, 1020 vehicles each, mirroring `content/world.json`.
pub fn reference_env() -> Environment {
    let layout: [(&str, f64, f64, f64, f64); 7] = [
        ("station_0001", 10.0, 10.0, 800.0, 0.015),
        ("station_0002", -10.0, -10.0, 700.0, 0.024),
        ("station_0003", 20.0, -20.0, 900.0, 0.017),
        ("station_0004", 13.0, -14.0, 900.0, 0.017),
        ("station_0005", -15.0, 10.0, 500.0, 0.017),
        ("station_0006", -11.0, 10.0, 500.0, 0.017),
        ("station_0007", 0.0, 10.0, 500.0, 0.017),
    ];
    let mut env = Environment::new(
        Constants {
            low_fuel_threshold: 0.25,
            tanker_capacity: 2000.0,
            tanker_speed: 3.0,
            tanker_transfer_rate: 100.0,
        },
        "test",
    );
    for (id, x, y, capacity, rate) in layout {
        env.register_station(station_with_vehicles(
            id,
            Position::new(x, y),
            capacity,
            1020,
            rate,
        ));
    }
    env
}
