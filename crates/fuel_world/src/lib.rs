//! World configuration loading shared between fuel_cli and fuel_daemon.

use anyhow::{Context, Result};
use fuel_core::{Constants, Environment, Position, Station, StationId, Vehicle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub config_version: String,
    pub constants: Constants,
    pub stations: Vec<StationDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDef {
    pub id: StationId,
    pub x: f64,
    pub y: f64,
    pub fuel_capacity: f64,
    /// Defaults to a full reservoir.
    #[serde(default)]
    pub initial_fuel_level: Option<f64>,
    pub vehicles: FleetDef,
}

/// `count` identical vehicles parked at one station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetDef {
    pub count: usize,
    pub tank_capacity: f64,
    pub consumption_rate: f64,
}

/// Validates loaded configuration, panicking on any authoring error.
///
/// Catches mistakes like: an empty world, two stations sharing an id, a
/// station placed on the refuel center, or non-positive rates.
pub fn validate_config(config: &WorldConfig) {
    let c = &config.constants;
    assert!(
        c.low_fuel_threshold > 0.0 && c.low_fuel_threshold <= 1.0,
        "low_fuel_threshold must be in (0, 1], got {}",
        c.low_fuel_threshold,
    );
    assert!(c.tanker_capacity > 0.0, "tanker_capacity must be positive");
    assert!(c.tanker_speed > 0.0, "tanker_speed must be positive");
    assert!(
        c.tanker_transfer_rate > 0.0,
        "tanker_transfer_rate must be positive"
    );

    assert!(!config.stations.is_empty(), "world config has no stations");

    let mut seen: HashSet<&StationId> = HashSet::new();
    for station in &config.stations {
        assert!(
            seen.insert(&station.id),
            "station id '{}' is duplicated",
            station.id,
        );
        assert!(
            station.fuel_capacity > 0.0,
            "station '{}' fuel_capacity must be positive",
            station.id,
        );
        if let Some(level) = station.initial_fuel_level {
            assert!(
                (0.0..=station.fuel_capacity).contains(&level),
                "station '{}' initial_fuel_level {level} is out of range",
                station.id,
            );
        }
        assert!(
            !Position::ORIGIN.is_close(station.x, station.y),
            "station '{}' sits on the refuel center",
            station.id,
        );
        assert!(
            station.vehicles.tank_capacity > 0.0,
            "station '{}' vehicle tank_capacity must be positive",
            station.id,
        );
        assert!(
            station.vehicles.consumption_rate > 0.0,
            "station '{}' vehicle consumption_rate must be positive",
            station.id,
        );
    }
}

pub fn load_world_config(path: &str) -> Result<WorldConfig> {
    let path = Path::new(path);
    let config: WorldConfig = serde_json::from_str(
        &std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
    )
    .with_context(|| format!("parsing {}", path.display()))?;
    validate_config(&config);
    Ok(config)
}

/// Build the world, registering stations in file order.
pub fn build_environment(config: &WorldConfig) -> Environment {
    let mut env = Environment::new(config.constants.clone(), config.config_version.clone());
    for def in &config.stations {
        let mut station = Station::new(
            def.id.clone(),
            Position::new(def.x, def.y),
            def.fuel_capacity,
        );
        if let Some(level) = def.initial_fuel_level {
            station = station.with_fuel_level(level);
        }
        let vehicle = Vehicle::new(def.vehicles.tank_capacity, def.vehicles.consumption_rate);
        station.add_vehicles(std::iter::repeat_n(vehicle, def.vehicles.count));
        env.register_station(station);
    }
    env
}

pub fn load_environment(path: &str) -> Result<Environment> {
    let config = load_world_config(path)?;
    Ok(build_environment(&config))
}
