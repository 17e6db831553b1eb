//! Validation tests for the shipped `content/world.json`.
//!
//! These load the real file and check:
//! 1. Schema validity: the file deserializes and passes `validate_config`
//! 2. Layout: ids, coordinates and fleets are what the simulation expects
//! 3. Playability: the world runs, dispatches, and delivers

use fuel_core::test_fixtures::reference_env;
use fuel_core::{Event, Position};
use fuel_world::{build_environment, load_world_config, WorldConfig};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Integration tests run from the crate directory, so go up two levels.
fn world_path() -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../content/world.json")
}

fn load_test_config() -> &'static WorldConfig {
    static CONFIG: OnceLock<WorldConfig> = OnceLock::new();
    CONFIG.get_or_init(|| {
        load_world_config(&world_path()).expect("shipped world config should load")
    })
}

// =========================================================================
// 1. Schema
// =========================================================================

#[test]
fn world_loads_successfully() {
    let _config = load_test_config();
}

#[test]
fn station_ids_are_non_empty_and_unique() {
    let config = load_test_config();
    let mut seen = HashSet::new();
    for station in &config.stations {
        assert!(!station.id.0.is_empty(), "station has empty id");
        assert!(seen.insert(station.id.0.as_str()), "duplicate id {}", station.id);
    }
}

// =========================================================================
// 2. Layout
// =========================================================================

#[test]
fn seven_stations_with_full_fleets() {
    let config = load_test_config();
    assert_eq!(config.stations.len(), 7);
    for station in &config.stations {
        assert_eq!(station.vehicles.count, 1020, "station '{}'", station.id);
        assert!(station.initial_fuel_level.is_none());
    }
}

#[test]
fn no_station_shares_coordinates_with_another() {
    let config = load_test_config();
    for (i, a) in config.stations.iter().enumerate() {
        for b in &config.stations[i + 1..] {
            assert!(
                !Position::new(a.x, a.y).is_close(b.x, b.y),
                "stations '{}' and '{}' overlap",
                a.id,
                b.id
            );
        }
    }
}

#[test]
fn built_world_matches_reference_fixture() {
    let mut from_file = build_environment(load_test_config());
    let mut fixture = reference_env();
    for _ in 0..300 {
        from_file.update();
        fixture.update();
    }
    assert_eq!(from_file.state_as_model(), fixture.state_as_model());
}

// =========================================================================
// 3. Playability
// =========================================================================

#[test]
fn world_dispatches_and_delivers() {
    let mut env = build_environment(load_test_config());
    let mut dispatched = false;
    for _ in 0..2000 {
        env.update();
        dispatched |= env
            .drain_events()
            .iter()
            .any(|e| matches!(e.event, Event::TankerDispatched { .. }));
    }
    assert!(dispatched, "tanker never dispatched in 2000 ticks");
    assert!(env.counters.fuel_delivered_total > 0.0);
}
