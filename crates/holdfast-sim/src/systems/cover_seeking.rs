//! Cover seeking system: resolves this tick's cover requests as one batch.
//!
//! Requests raised in the same tick compete by priority; the coordinator
//! hands out reservations highest priority first.

use std::collections::HashMap;

use hecs::World;
use tracing::warn;

use holdfast_core::components::{CoverLink, Unit};
use holdfast_core::constants::SEEK_RETRY_TICKS;
use holdfast_core::enums::{AlertLevel, UnitCoverState};
use holdfast_core::error::CoverError;
use holdfast_core::events::Alert;
use holdfast_core::types::UnitId;
use holdfast_cover::{CoverAssignmentCoordinator, CoverRequest};

/// Run the batch and record each outcome on the requesting unit.
pub fn run(
    world: &mut World,
    coordinator: &CoverAssignmentCoordinator,
    requests: Vec<CoverRequest>,
    current_tick: u64,
    alerts: &mut Vec<Alert>,
) {
    if requests.is_empty() {
        return;
    }

    let results = coordinator.request_cover_batch(requests);

    let mut links: HashMap<UnitId, hecs::Entity> = HashMap::new();
    for (entity, unit) in world.query::<&Unit>().iter() {
        links.insert(unit.id, entity);
    }

    for (unit, result) in results {
        let Some(&entity) = links.get(&unit) else {
            continue;
        };
        let Ok(mut link) = world.get::<&mut CoverLink>(entity) else {
            continue;
        };

        match result {
            Ok(Some(point)) => {
                link.cover = Some(point.id());
                link.retry_at_tick = 0;
                if link.state != UnitCoverState::SeekingCover {
                    link.state = UnitCoverState::SeekingCover;
                    link.state_start_tick = current_tick;
                }
            }
            Ok(None) => {
                link.cover = None;
                link.retry_at_tick = current_tick + SEEK_RETRY_TICKS;
                alerts.push(Alert {
                    level: AlertLevel::Warning,
                    message: format!("{unit} found no cover"),
                    tick: current_tick,
                });
            }
            // The unit already holds a point; resync the link to it.
            Err(CoverError::AlreadyClaimed { point, .. }) => {
                link.cover = Some(point);
            }
            Err(err) => {
                warn!(%unit, %err, "cover request failed");
                link.cover = None;
                link.retry_at_tick = current_tick + SEEK_RETRY_TICKS;
            }
        }
    }
}
