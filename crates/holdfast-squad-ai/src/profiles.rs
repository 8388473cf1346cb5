//! Role-specific behavioral profiles.
//!
//! Consolidates per-role parameters for cover seeking and priority.

use holdfast_core::constants::*;
use holdfast_core::enums::UnitRole;

/// Behavioral profile for a unit role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleProfile {
    /// Priority before leadership, experience and wounds are added.
    pub base_priority: f64,
    /// How far the unit is willing to run for cover (m).
    pub search_radius: f64,
    /// Multiplier on `UNIT_RUN_SPEED`.
    pub speed_factor: f64,
}

/// Get the behavioral profile for a given role.
pub fn get_profile(role: UnitRole) -> RoleProfile {
    match role {
        UnitRole::Rifleman => RoleProfile {
            base_priority: 10.0,
            search_radius: DEFAULT_SEARCH_RADIUS,
            speed_factor: 1.0,
        },
        UnitRole::Support => RoleProfile {
            base_priority: 15.0,
            search_radius: DEFAULT_SEARCH_RADIUS * 0.75, // carries the gun
            speed_factor: 0.8,
        },
        UnitRole::Medic => RoleProfile {
            base_priority: 25.0,
            search_radius: DEFAULT_SEARCH_RADIUS,
            speed_factor: 1.0,
        },
        UnitRole::Engineer => RoleProfile {
            base_priority: 12.0,
            search_radius: DEFAULT_SEARCH_RADIUS,
            speed_factor: 0.9,
        },
        UnitRole::Sniper => RoleProfile {
            base_priority: 18.0,
            search_radius: DEFAULT_SEARCH_RADIUS * 1.5,
            speed_factor: 1.0,
        },
        UnitRole::Officer => RoleProfile {
            base_priority: 30.0,
            search_radius: DEFAULT_SEARCH_RADIUS,
            speed_factor: 1.0,
        },
    }
}

/// Cover priority of a unit. Higher wins a contested point.
///
/// Health is clamped to `[0, UNIT_MAX_HEALTH]`; the wounded bonus grows
/// linearly with missing health.
pub fn priority_score(
    profile: &RoleProfile,
    squad_leader: bool,
    specialist: bool,
    experience: u32,
    health: f64,
) -> f64 {
    let mut score = profile.base_priority;
    if squad_leader {
        score += PRIORITY_LEADER_BONUS;
    }
    if specialist {
        score += PRIORITY_SPECIALIST_BONUS;
    }
    score += experience.min(PRIORITY_MAX_EXPERIENCE) as f64 * PRIORITY_PER_EXPERIENCE;

    let health = if health.is_nan() { 0.0 } else { health.clamp(0.0, UNIT_MAX_HEALTH) };
    score += (1.0 - health / UNIT_MAX_HEALTH) * PRIORITY_WOUNDED_WEIGHT;
    score
}
