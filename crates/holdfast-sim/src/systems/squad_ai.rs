//! Squad AI system: decides each unit's cover behavior every tick.
//!
//! Calls the unit FSM from holdfast-squad-ai, applies state transitions to
//! `CoverLink`, and hands back the cover requests for the seeking system.

use hecs::World;
use tracing::debug;

use holdfast_core::components::{CoverLink, Dead, Health, Unit, UnitProfile};
use holdfast_core::types::{CoverPointId, Position, UnitId};
use holdfast_cover::{CoverAssignmentCoordinator, CoverRequest, ThreatDirection};

use holdfast_squad_ai::fsm::{evaluate, UnitAction, UnitContext};
use holdfast_squad_ai::profiles::{get_profile, priority_score};

use crate::systems::movement;

/// Cover priority of a unit from its components.
pub fn unit_priority(profile: &UnitProfile, health: &Health) -> f64 {
    priority_score(
        &get_profile(profile.role),
        profile.squad_leader,
        profile.specialist,
        profile.experience,
        health.0,
    )
}

/// Run the squad AI: evaluate the FSM for each live unit, apply updates,
/// and return the cover requests raised this tick.
pub fn run(
    world: &mut World,
    coordinator: &CoverAssignmentCoordinator,
    threat: Option<Position>,
    current_tick: u64,
) -> Vec<CoverRequest> {
    let registry = coordinator.registry();
    let threat_direction = threat.map_or(ThreatDirection::Unknown, ThreatDirection::From);

    let mut requests = Vec::new();
    let mut arrivals: Vec<(hecs::Entity, UnitId, CoverPointId)> = Vec::new();

    {
        let mut query =
            world.query::<(&Unit, &UnitProfile, &Health, &Position, &mut CoverLink, Option<&Dead>)>();
        for (entity, (unit, profile, health, pos, link, dead)) in query.iter() {
            if dead.is_some() {
                continue;
            }

            let point = link.cover.and_then(|id| registry.get(id));
            let ctx = UnitContext {
                state: link.state,
                cover: link.cover,
                cover_held: point.as_ref().is_some_and(|p| p.holds(unit.id)),
                distance_to_cover: point.as_ref().map(|p| pos.range_to(&p.position())),
                threat_present: threat.is_some(),
                ordered: link.ordered,
                current_tick,
                retry_at_tick: link.retry_at_tick,
            };

            let update = evaluate(&ctx);
            if update.state_changed {
                debug!(unit = %unit.id, from = ?link.state, to = ?update.new_state, "cover state");
                link.state = update.new_state;
                link.state_start_tick = current_tick;
            }
            link.cover = update.new_cover;

            match update.action {
                UnitAction::RequestCover => requests.push(CoverRequest {
                    unit: unit.id,
                    priority: unit_priority(profile, health),
                    threat: threat_direction,
                    origin: *pos,
                    radius: get_profile(profile.role).search_radius,
                }),
                UnitAction::ConfirmArrival(point) => arrivals.push((entity, unit.id, point)),
                UnitAction::Hold | UnitAction::MoveToCover(_) => {}
            }
        }
    }

    for (entity, unit, point) in arrivals {
        movement::arrive(world, coordinator, entity, unit, point, current_tick);
    }

    requests
}
