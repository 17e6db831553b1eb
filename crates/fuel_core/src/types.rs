//! Type definitions for `fuel_core`.
//!
//! Entities, ID newtypes, events, and the serialisable snapshot models
//! handed to whatever transport drives the simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(StationId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Relative tolerance used when matching requested coordinates to an entity.
pub const COORDINATE_REL_TOL: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// True when both axes match within [`COORDINATE_REL_TOL`], scaled by the
    /// larger magnitude. An exact zero therefore only matches another zero.
    pub fn is_close(self, x: f64, y: f64) -> bool {
        is_close(self.x, x) && is_close(self.y, y)
    }
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= COORDINATE_REL_TOL * a.abs().max(b.abs())
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A fuel consumer parked at a station. Holds no fuel of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub tank_capacity: f64,
    pub consumption_rate: f64,
}

#[derive(Debug, Clone)]
pub struct Station {
    pub id: StationId,
    pub position: Position,
    pub fuel_capacity: f64,
    pub fuel_level: f64,
    /// Demand the reservoir could not cover on the most recent draw.
    pub loss: f64,
    /// Cumulative unmet demand since construction.
    pub loss_total: f64,
    pub(crate) vehicles: Vec<Vehicle>,
    /// Sum of `consumption_rate` over `vehicles`, maintained on insert.
    pub(crate) consumption_per_tick: f64,
}

/// The tanker's home base. Unlimited fuel, always at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefuelCenter {
    pub position: Position,
}

impl Default for RefuelCenter {
    fn default() -> Self {
        Self {
            position: Position::ORIGIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Station(StationId),
    Depot,
}

impl Target {
    /// Station id, or `"depot"` for the refuel center.
    pub fn label(&self) -> String {
        match self {
            Target::Station(id) => id.0.clone(),
            Target::Depot => "depot".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankerPhase {
    Idle,
    EnRouteToStation,
    DockedTransferring,
    EnRouteToDepot,
    DockedReloading,
}

impl TankerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TankerPhase::Idle => "idle",
            TankerPhase::EnRouteToStation => "en_route_to_station",
            TankerPhase::DockedTransferring => "docked_transferring",
            TankerPhase::EnRouteToDepot => "en_route_to_depot",
            TankerPhase::DockedReloading => "docked_reloading",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tanker {
    pub position: Position,
    pub fuel_payload: f64,
    pub capacity: f64,
    /// Distance covered per tick.
    pub speed: f64,
    /// Fuel moved per tick while docked, in either direction.
    pub transfer_rate: f64,
    pub target: Option<Target>,
    /// Station target waiting for the tanker to come back full from the depot.
    pub queued: Option<Target>,
    pub phase: TankerPhase,
}

// ---------------------------------------------------------------------------
// World configuration & bookkeeping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// Stations below this fuel ratio are candidates for automatic dispatch.
    pub low_fuel_threshold: f64,
    pub tanker_capacity: f64,
    pub tanker_speed: f64,
    pub tanker_transfer_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
    pub config_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub fuel_consumed_total: f64,
    pub fuel_delivered_total: f64,
    pub fuel_loaded_total: f64,
    /// Vehicle demand that went unserved because a station was dry.
    pub fuel_lost_total: f64,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    TankerDispatched {
        station_id: StationId,
        fuel_ratio: f64,
    },
    DestinationOverridden {
        target: Target,
    },
    TankerArrived {
        target: Target,
    },
    FuelDelivered {
        station_id: StationId,
        amount: f64,
    },
    TankerReloaded {
        payload: f64,
    },
    StationEmptied {
        station_id: StationId,
    },
    AlertRaised {
        alert_id: String,
        severity: AlertSeverity,
        message: String,
        suggested_action: String,
    },
    AlertCleared {
        alert_id: String,
    },
}

// ---------------------------------------------------------------------------
// Snapshot models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub tick: u64,
    pub stations: Vec<StationModel>,
    pub tanker: TankerModel,
    pub refuel_center: RefuelCenterModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationModel {
    pub id: StationId,
    pub x: f64,
    pub y: f64,
    pub fuel_level: f64,
    pub fuel_capacity: f64,
    pub vehicle_count: usize,
    pub loss: f64,
    pub loss_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankerModel {
    pub x: f64,
    pub y: f64,
    pub fuel_payload: f64,
    pub capacity: f64,
    pub phase: TankerPhase,
    /// Station id, `"depot"`, or `None` when idle.
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefuelCenterModel {
    pub x: f64,
    pub y: f64,
}

/// Result of resolving a coordinate pair to a tanker destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationOutcome {
    Station(StationId),
    Depot,
    /// Nothing at the coordinates; the tanker keeps its current target.
    NotFound,
}

impl DestinationOutcome {
    pub fn is_found(&self) -> bool {
        !matches!(self, DestinationOutcome::NotFound)
    }

    pub fn message(&self) -> String {
        match self {
            DestinationOutcome::Station(id) => format!("Destination set to {id}"),
            DestinationOutcome::Depot => "Destination set to refuel center".to_string(),
            DestinationOutcome::NotFound => {
                "No station at the requested coordinates; destination unchanged".to_string()
            }
        }
    }
}
