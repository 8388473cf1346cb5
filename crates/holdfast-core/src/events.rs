//! Events emitted by the cover system for UI and visualization collaborators.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{CoverPointId, UnitId};

/// A cover occupancy change. Emitted after the mutation that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CoverEvent {
    /// A unit claimed a future slot.
    Reserved { point: CoverPointId, unit: UnitId },
    /// A unit's reservation was consumed because it is now occupying.
    ReservationCleared { point: CoverPointId, unit: UnitId },
    /// A unit is physically in the point.
    Occupied { point: CoverPointId, unit: UnitId },
    /// A unit gave up its slot (reservation or occupancy).
    Vacated { point: CoverPointId, unit: UnitId },
    /// The derived state changed.
    StateChanged {
        point: CoverPointId,
        old: CoverState,
        new: CoverState,
    },
    /// The point was taken out of rotation.
    Disabled { point: CoverPointId },
    /// The point was put back into rotation.
    Enabled { point: CoverPointId },
}

/// Discriminant of a [`CoverEvent`], used to register handlers per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverEventKind {
    Reserved,
    ReservationCleared,
    Occupied,
    Vacated,
    StateChanged,
    Disabled,
    Enabled,
}

impl CoverEvent {
    pub fn kind(&self) -> CoverEventKind {
        match self {
            CoverEvent::Reserved { .. } => CoverEventKind::Reserved,
            CoverEvent::ReservationCleared { .. } => CoverEventKind::ReservationCleared,
            CoverEvent::Occupied { .. } => CoverEventKind::Occupied,
            CoverEvent::Vacated { .. } => CoverEventKind::Vacated,
            CoverEvent::StateChanged { .. } => CoverEventKind::StateChanged,
            CoverEvent::Disabled { .. } => CoverEventKind::Disabled,
            CoverEvent::Enabled { .. } => CoverEventKind::Enabled,
        }
    }

    /// The cover point this event concerns.
    pub fn point(&self) -> CoverPointId {
        match self {
            CoverEvent::Reserved { point, .. }
            | CoverEvent::ReservationCleared { point, .. }
            | CoverEvent::Occupied { point, .. }
            | CoverEvent::Vacated { point, .. }
            | CoverEvent::StateChanged { point, .. }
            | CoverEvent::Disabled { point }
            | CoverEvent::Enabled { point } => *point,
        }
    }

    /// The unit this event concerns, if any.
    pub fn unit(&self) -> Option<UnitId> {
        match self {
            CoverEvent::Reserved { unit, .. }
            | CoverEvent::ReservationCleared { unit, .. }
            | CoverEvent::Occupied { unit, .. }
            | CoverEvent::Vacated { unit, .. } => Some(*unit),
            _ => None,
        }
    }
}

/// Alert for the UI alert queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub tick: u64,
}
