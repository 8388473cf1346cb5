//! Simulation state snapshot: the complete visible state handed to the host each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{Alert, CoverEvent};
use crate::types::{CoverPointId, Position, SimTime, UnitId};

/// Complete state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub threat: Option<Position>,
    pub units: Vec<UnitView>,
    pub cover_points: Vec<CoverPointView>,
    pub alerts: Vec<Alert>,
    /// Cover events emitted during this tick, in emission order.
    pub events: Vec<CoverEvent>,
    pub summary: CoverSummary,
}

/// A unit as seen by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub name: String,
    pub squad: u32,
    pub role: UnitRole,
    pub position: Position,
    pub health: f64,
    pub priority: f64,
    pub state: UnitCoverState,
    pub cover: Option<CoverPointId>,
}

/// A cover point as seen by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverPointView {
    pub id: CoverPointId,
    pub position: Position,
    pub quality: CoverQuality,
    pub state: CoverState,
    pub max_occupants: u32,
    pub occupants: Vec<UnitId>,
    pub reservations: Vec<UnitId>,
    /// Effectiveness against the current threat (full value without one).
    pub effectiveness: f64,
}

/// Aggregate counters for the status line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverSummary {
    pub units_total: u32,
    pub units_in_cover: u32,
    pub units_seeking: u32,
    pub units_lost: u32,
    pub points_disabled: u32,
}
