//! Unit cover finite state machine.
//!
//! Pure functions that decide what a unit should do about cover this tick,
//! given its current cover state and situation. No ECS or cover-registry
//! dependency. The caller gathers the facts and carries out the action.

use holdfast_core::constants::ARRIVAL_TOLERANCE;
use holdfast_core::enums::UnitCoverState;
use holdfast_core::types::CoverPointId;

/// Input to the unit FSM for a single entity.
#[derive(Debug, Clone, Copy)]
pub struct UnitContext {
    pub state: UnitCoverState,
    /// Point the unit believes it reserved or occupies.
    pub cover: Option<CoverPointId>,
    /// Whether that point still records the unit (reservation or occupancy).
    pub cover_held: bool,
    /// Distance to `cover`, if any (m).
    pub distance_to_cover: Option<f64>,
    pub threat_present: bool,
    /// Explicitly ordered to seek cover.
    pub ordered: bool,
    pub current_tick: u64,
    /// Earliest tick for the next search after a failed one.
    pub retry_at_tick: u64,
}

/// What the caller should do for the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitAction {
    /// Nothing this tick.
    Hold,
    /// Ask the coordinator for cover.
    RequestCover,
    /// Keep running toward the reserved point.
    MoveToCover(CoverPointId),
    /// At the reserved point; convert the reservation into occupancy.
    ConfirmArrival(CoverPointId),
}

/// Output from the unit FSM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitUpdate {
    pub new_state: UnitCoverState,
    /// Cover reference after this tick. `None` when the old one was lost.
    pub new_cover: Option<CoverPointId>,
    pub action: UnitAction,
    pub state_changed: bool,
}

/// Evaluate the FSM for one unit.
pub fn evaluate(ctx: &UnitContext) -> UnitUpdate {
    match ctx.state {
        UnitCoverState::Idle => evaluate_idle(ctx),
        UnitCoverState::SeekingCover => evaluate_seeking(ctx),
        UnitCoverState::InCover => evaluate_in_cover(ctx),
    }
}

fn wants_cover(ctx: &UnitContext) -> bool {
    ctx.threat_present || ctx.ordered
}

fn update(ctx: &UnitContext, state: UnitCoverState, cover: Option<CoverPointId>, action: UnitAction) -> UnitUpdate {
    UnitUpdate {
        new_state: state,
        new_cover: cover,
        action,
        state_changed: state != ctx.state,
    }
}

fn search_or_wait(ctx: &UnitContext) -> UnitAction {
    if ctx.current_tick >= ctx.retry_at_tick {
        UnitAction::RequestCover
    } else {
        UnitAction::Hold
    }
}

fn evaluate_idle(ctx: &UnitContext) -> UnitUpdate {
    if !wants_cover(ctx) {
        return update(ctx, UnitCoverState::Idle, None, UnitAction::Hold);
    }
    update(ctx, UnitCoverState::SeekingCover, None, search_or_wait(ctx))
}

fn evaluate_seeking(ctx: &UnitContext) -> UnitUpdate {
    match ctx.cover {
        Some(point) if ctx.cover_held => {
            let arrived = ctx
                .distance_to_cover
                .is_some_and(|d| d <= ARRIVAL_TOLERANCE);
            let action = if arrived {
                UnitAction::ConfirmArrival(point)
            } else {
                UnitAction::MoveToCover(point)
            };
            update(ctx, UnitCoverState::SeekingCover, Some(point), action)
        }
        // Reservation revoked (point destroyed or removed) or never made.
        _ => {
            if !wants_cover(ctx) {
                return update(ctx, UnitCoverState::Idle, None, UnitAction::Hold);
            }
            update(ctx, UnitCoverState::SeekingCover, None, search_or_wait(ctx))
        }
    }
}

fn evaluate_in_cover(ctx: &UnitContext) -> UnitUpdate {
    match ctx.cover {
        // Threat gone: stay put.
        Some(point) if ctx.cover_held => {
            update(ctx, UnitCoverState::InCover, Some(point), UnitAction::Hold)
        }
        // Cover lost under the unit.
        _ => update(ctx, UnitCoverState::SeekingCover, None, search_or_wait(ctx)),
    }
}
