//! Damage integration: cover effectiveness scales incoming damage.

use hecs::World;

use holdfast_core::components::{CoverLink, Dead, Health};
use holdfast_core::enums::UnitCoverState;
use holdfast_core::types::Position;
use holdfast_cover::{CoverRegistry, ThreatDirection};

/// Damage left after cover: `raw * (1 - effectiveness)`.
/// Negative raw damage counts as none; effectiveness is clamped to `[0, 1]`.
pub fn apply_cover_damage(raw: f64, effectiveness: f64) -> f64 {
    let effectiveness = if effectiveness.is_nan() {
        0.0
    } else {
        effectiveness.clamp(0.0, 1.0)
    };
    raw.max(0.0) * (1.0 - effectiveness)
}

/// Effectiveness protecting a unit right now. Only occupants are protected;
/// a unit still running to a reservation is in the open.
pub fn current_effectiveness(link: &CoverLink, registry: &CoverRegistry, threat: Option<Position>) -> f64 {
    if link.state != UnitCoverState::InCover {
        return 0.0;
    }
    let threat = threat.map_or(ThreatDirection::Unknown, ThreatDirection::From);
    link.cover
        .and_then(|id| registry.get(id))
        .map_or(0.0, |point| threat.effectiveness_of(&point))
}

/// Apply `amount` raw damage to one unit. Marks it `Dead` at zero health.
/// Returns the damage actually taken, or `None` if the entity is not a unit.
pub fn damage_unit(
    world: &mut World,
    registry: &CoverRegistry,
    threat: Option<Position>,
    entity: hecs::Entity,
    amount: f64,
) -> Option<f64> {
    let (taken, killed) = {
        let mut query = world.query_one::<(&mut Health, &CoverLink)>(entity).ok()?;
        let (health, link) = query.get()?;
        let taken = apply_cover_damage(amount, current_effectiveness(link, registry, threat));
        health.0 = (health.0 - taken).max(0.0);
        (taken, health.0 <= 0.0)
    };
    if killed {
        let _ = world.insert_one(entity, Dead);
    }
    Some(taken)
}
