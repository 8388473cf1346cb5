//! Entity spawn factories for setting up the simulation world.
//!
//! Cover points go into the shared registry; units are hecs entities
//! carrying identity, profile, health, position and cover bookkeeping.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use holdfast_core::components::*;
use holdfast_core::constants::SPAWN_JITTER;
use holdfast_core::error::CoverError;
use holdfast_core::types::{Position, UnitId};
use holdfast_cover::CoverRegistry;

use crate::scenario::{ScenarioConfig, UnitDef};

/// Register every cover point of the scenario. Returns how many were added.
pub fn spawn_cover_points(
    registry: &CoverRegistry,
    scenario: &ScenarioConfig,
) -> Result<usize, CoverError> {
    for def in &scenario.cover_points {
        registry.spawn(def.clone())?;
    }
    Ok(scenario.cover_points.len())
}

/// Spawn every squad member around its squad origin. Unit ids are assigned
/// sequentially from 1 in squad order.
pub fn spawn_units(world: &mut World, rng: &mut ChaCha8Rng, scenario: &ScenarioConfig) -> usize {
    let mut next_id = 1u32;
    for squad in &scenario.squads {
        for member in &squad.members {
            let position = Position::new(
                squad.origin.x + rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER),
                squad.origin.y + rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER),
                squad.origin.z,
            );
            spawn_unit(world, UnitId(next_id), squad.squad, member, position);
            next_id += 1;
        }
    }
    (next_id - 1) as usize
}

/// Spawn a single unit entity, idle and out of cover.
pub fn spawn_unit(
    world: &mut World,
    id: UnitId,
    squad: u32,
    def: &UnitDef,
    position: Position,
) -> hecs::Entity {
    world.spawn((
        Unit {
            id,
            name: def.name.clone(),
            squad,
        },
        UnitProfile {
            role: def.role,
            squad_leader: def.squad_leader,
            specialist: def.specialist,
            experience: def.experience,
        },
        Health(def.health),
        position,
        CoverLink::default(),
    ))
}

/// Find the entity of a unit by id.
pub fn find_unit(world: &World, id: UnitId) -> Option<hecs::Entity> {
    world
        .query::<&Unit>()
        .iter()
        .find(|(_, unit)| unit.id == id)
        .map(|(entity, _)| entity)
}
