use super::*;

fn tanker_at(x: f64, y: f64) -> Tanker {
    Tanker::new(Position::new(x, y), 1000.0, 5.0, 50.0)
}

#[test]
fn new_tanker_is_full_and_idle() {
    let tanker = tanker_at(0.0, 0.0);
    assert!(tanker.is_full());
    assert_eq!(tanker.phase, TankerPhase::Idle);
    assert!(tanker.target.is_none());
}

#[test]
fn move_toward_partial_step_follows_bearing() {
    let mut tanker = tanker_at(0.0, 0.0);
    let arrived = tanker.move_toward(Position::new(6.0, 8.0), 5.0);
    assert!(!arrived);
    assert!((tanker.position.x - 3.0).abs() < 1e-12);
    assert!((tanker.position.y - 4.0).abs() < 1e-12);
}

#[test]
fn move_toward_snaps_when_within_reach() {
    let mut tanker = tanker_at(1.0, 1.0);
    let target = Position::new(4.0, 5.0);
    assert!(tanker.move_toward(target, 5.0));
    assert!(bits_eq(tanker.position.x, 4.0));
    assert!(bits_eq(tanker.position.y, 5.0));
}

#[test]
fn move_toward_current_position_arrives_immediately() {
    let mut tanker = tanker_at(2.0, 2.0);
    assert!(tanker.move_toward(Position::new(2.0, 2.0), 5.0));
}

#[test]
fn dock_and_transfer_clamps_to_station_headroom() {
    let mut station =
        Station::new(station_a(), Position::new(10.0, 10.0), 800.0).with_fuel_level(797.0);
    let mut tanker = Tanker::new(Position::new(10.0, 10.0), 100.0, 5.0, 10.0);
    tanker.fuel_payload = 50.0;

    let moved = tanker.dock_and_transfer(&mut station, 1);

    assert!((moved - 3.0).abs() < 1e-12);
    assert!((tanker.fuel_payload - 47.0).abs() < 1e-12);
    assert!(station.is_full());
}

#[test]
fn dock_and_transfer_limited_by_rate() {
    let mut station =
        Station::new(station_a(), Position::new(10.0, 10.0), 800.0).with_fuel_level(100.0);
    let mut tanker = Tanker::new(Position::new(10.0, 10.0), 100.0, 5.0, 10.0);

    let moved = tanker.dock_and_transfer(&mut station, 2);

    assert!((moved - 20.0).abs() < 1e-12);
    assert!((tanker.fuel_payload - 80.0).abs() < 1e-12);
    assert!((station.fuel_level - 120.0).abs() < 1e-12);
}

#[test]
fn dock_and_transfer_limited_by_payload() {
    let mut station =
        Station::new(station_a(), Position::new(10.0, 10.0), 800.0).with_fuel_level(100.0);
    let mut tanker = Tanker::new(Position::new(10.0, 10.0), 100.0, 5.0, 10.0);
    tanker.fuel_payload = 4.0;

    let moved = tanker.dock_and_transfer(&mut station, 1);

    assert!((moved - 4.0).abs() < 1e-12);
    assert!(tanker.is_empty());
    assert!(bits_eq(tanker.fuel_payload, 0.0));
}

#[test]
#[should_panic(expected = "must be docked")]
fn dock_and_transfer_away_from_station_panics() {
    let mut station = Station::new(station_a(), Position::new(10.0, 10.0), 800.0);
    let mut tanker = tanker_at(0.0, 0.0);
    tanker.dock_and_transfer(&mut station, 1);
}

#[test]
fn reload_clamps_to_capacity() {
    let depot = RefuelCenter::default();
    let mut tanker = tanker_at(0.0, 0.0);
    tanker.fuel_payload = 990.0;

    let loaded = tanker.reload(&depot, 1);

    assert!((loaded - 10.0).abs() < 1e-12);
    assert!(tanker.is_full());
}

#[test]
fn reload_adds_rate_per_tick() {
    let depot = RefuelCenter::default();
    let mut tanker = tanker_at(0.0, 0.0);
    tanker.fuel_payload = 0.0;
    let loaded = tanker.reload(&depot, 3);
    assert!((loaded - 150.0).abs() < 1e-12);
    assert!((tanker.fuel_payload - 150.0).abs() < 1e-12);
}

#[test]
#[should_panic(expected = "refuel center to reload")]
fn reload_away_from_depot_panics() {
    let depot = RefuelCenter::default();
    let mut tanker = tanker_at(3.0, 0.0);
    tanker.reload(&depot, 1);
}

#[test]
#[should_panic(expected = "speed must be positive")]
fn zero_speed_panics() {
    let _ = Tanker::new(Position::ORIGIN, 100.0, 0.0, 10.0);
}
