//! Movement system: runs seeking units toward their reserved point and
//! confirms arrival once they are within tolerance.

use hecs::World;
use tracing::debug;

use holdfast_core::components::{CoverLink, Dead, Unit, UnitProfile};
use holdfast_core::constants::{ARRIVAL_TOLERANCE, DT, UNIT_RUN_SPEED};
use holdfast_core::enums::UnitCoverState;
use holdfast_core::types::{CoverPointId, Position, UnitId};
use holdfast_cover::CoverAssignmentCoordinator;

use holdfast_squad_ai::profiles::get_profile;

/// Step every seeking unit toward its point; confirm those that reach it.
pub fn run(world: &mut World, coordinator: &CoverAssignmentCoordinator, current_tick: u64) {
    let registry = coordinator.registry();
    let mut arrivals: Vec<(hecs::Entity, UnitId, CoverPointId)> = Vec::new();

    for (entity, (unit, profile, pos, link, dead)) in world
        .query_mut::<(&Unit, &UnitProfile, &mut Position, &CoverLink, Option<&Dead>)>()
    {
        if dead.is_some() || link.state != UnitCoverState::SeekingCover {
            continue;
        }
        let Some(point) = link.cover.and_then(|id| registry.get(id)) else {
            continue;
        };

        let target = point.position();
        let step = UNIT_RUN_SPEED * get_profile(profile.role).speed_factor * DT;
        *pos = pos.step_toward(&target, step);

        if pos.range_to(&target) <= ARRIVAL_TOLERANCE {
            arrivals.push((entity, unit.id, point.id()));
        }
    }

    for (entity, unit, point) in arrivals {
        arrive(world, coordinator, entity, unit, point, current_tick);
    }
}

/// Convert the unit's reservation at `point` into occupancy.
///
/// On success the unit is `InCover`. On failure the coordinator has already
/// released it, so the link is cleared and the unit searches again next tick.
pub fn arrive(
    world: &mut World,
    coordinator: &CoverAssignmentCoordinator,
    entity: hecs::Entity,
    unit: UnitId,
    point: CoverPointId,
    current_tick: u64,
) {
    let Ok(mut link) = world.get::<&mut CoverLink>(entity) else {
        return;
    };

    match coordinator.confirm_arrival(unit, point) {
        Ok(_) => {
            link.state = UnitCoverState::InCover;
            link.state_start_tick = current_tick;
            link.ordered = false;
        }
        Err(err) => {
            debug!(%unit, %point, %err, "arrival failed, searching again");
            link.cover = None;
            link.retry_at_tick = current_tick;
        }
    }
}
