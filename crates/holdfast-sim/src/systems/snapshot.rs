//! Snapshot system: queries the ECS world and the cover registry and builds
//! a complete SimSnapshot.
//!
//! This system is read-only and never modifies the world or any cover point.

use hecs::World;

use holdfast_core::components::*;
use holdfast_core::enums::*;
use holdfast_core::events::{Alert, CoverEvent};
use holdfast_core::state::*;
use holdfast_core::types::{Position, SimTime};
use holdfast_cover::{CoverRegistry, ThreatDirection};

use crate::systems::squad_ai::unit_priority;

/// Everything the snapshot needs besides the world and the registry.
pub struct SnapshotInputs {
    pub time: SimTime,
    pub phase: GamePhase,
    pub threat: Option<Position>,
    pub alerts: Vec<Alert>,
    pub events: Vec<CoverEvent>,
    pub units_lost: u32,
}

/// Build a complete SimSnapshot from the current world state.
pub fn build_snapshot(world: &World, registry: &CoverRegistry, inputs: SnapshotInputs) -> SimSnapshot {
    let units = build_units(world);
    let cover_points = build_cover_points(registry, inputs.threat);

    let summary = CoverSummary {
        units_total: units.len() as u32,
        units_in_cover: count_state(&units, UnitCoverState::InCover),
        units_seeking: count_state(&units, UnitCoverState::SeekingCover),
        units_lost: inputs.units_lost,
        points_disabled: cover_points
            .iter()
            .filter(|p| p.state == CoverState::Disabled)
            .count() as u32,
    };

    SimSnapshot {
        time: inputs.time,
        phase: inputs.phase,
        threat: inputs.threat,
        units,
        cover_points,
        alerts: inputs.alerts,
        events: inputs.events,
        summary,
    }
}

fn count_state(units: &[UnitView], state: UnitCoverState) -> u32 {
    units.iter().filter(|u| u.state == state).count() as u32
}

/// Build UnitView list from all unit entities, sorted by id.
fn build_units(world: &World) -> Vec<UnitView> {
    let mut units: Vec<UnitView> = world
        .query::<(&Unit, &UnitProfile, &Health, &Position, &CoverLink)>()
        .iter()
        .map(|(_, (unit, profile, health, pos, link))| UnitView {
            id: unit.id,
            name: unit.name.clone(),
            squad: unit.squad,
            role: profile.role,
            position: *pos,
            health: health.0,
            priority: unit_priority(profile, health),
            state: link.state,
            cover: link.cover,
        })
        .collect();

    units.sort_by_key(|u| u.id);
    units
}

/// Build CoverPointView list from the registry, sorted by id.
fn build_cover_points(registry: &CoverRegistry, threat: Option<Position>) -> Vec<CoverPointView> {
    let threat = threat.map_or(ThreatDirection::Unknown, ThreatDirection::From);
    registry
        .all()
        .iter()
        .map(|point| {
            let snap = point.snapshot();
            CoverPointView {
                id: snap.id,
                position: snap.position,
                quality: snap.quality,
                state: snap.state,
                max_occupants: snap.max_occupants,
                occupants: snap.occupants,
                reservations: snap.reservations,
                effectiveness: threat.effectiveness_of(point),
            }
        })
        .collect()
}
