//! Cleanup system: gives up the cover of dead units and despawns them.

use hecs::{Entity, World};
use tracing::info;

use holdfast_core::components::{Dead, Unit};
use holdfast_core::types::UnitId;
use holdfast_cover::CoverAssignmentCoordinator;

/// Release and forget every dead unit, then despawn it.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
/// Returns the units removed.
pub fn run(
    world: &mut World,
    coordinator: &CoverAssignmentCoordinator,
    despawn_buffer: &mut Vec<Entity>,
) -> Vec<UnitId> {
    despawn_buffer.clear();
    let mut removed = Vec::new();

    for (entity, (unit, _dead)) in world.query_mut::<(&Unit, &Dead)>() {
        let outcome = coordinator.forget(unit.id);
        info!(unit = %unit.id, name = %unit.name, ?outcome, "unit lost");
        removed.push(unit.id);
        despawn_buffer.push(entity);
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    removed
}
