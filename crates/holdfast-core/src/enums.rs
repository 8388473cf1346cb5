//! Enumeration types used throughout the simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cover quality classification of a cover point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverQuality {
    /// Open ground.
    #[default]
    None,
    /// Low walls, bushes, crates.
    Light,
    /// Full-height walls, vehicles, rock.
    Heavy,
    /// Inside a building. Protects from every direction.
    Garrison,
    /// Exposed position that offers no reduction at all.
    Negative,
}

impl CoverQuality {
    /// Damage-reduction fraction in `[0, 1]`.
    pub fn damage_reduction(self) -> f64 {
        use crate::constants::*;

        let raw = match self {
            CoverQuality::None => COVER_REDUCTION_NONE,
            CoverQuality::Light => COVER_REDUCTION_LIGHT,
            CoverQuality::Heavy => COVER_REDUCTION_HEAVY,
            CoverQuality::Garrison => COVER_REDUCTION_GARRISON,
            CoverQuality::Negative => COVER_REDUCTION_NEGATIVE,
        };
        raw.clamp(0.0, 1.0)
    }

    /// Whether this quality protects regardless of threat direction.
    pub fn is_omnidirectional(self) -> bool {
        matches!(self, CoverQuality::Garrison)
    }
}

/// Derived state of a cover point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverState {
    /// At least one slot free and not disabled.
    #[default]
    Available,
    /// Full, with at least one unit physically present.
    Occupied,
    /// Full, every slot held by a reservation.
    Reserved,
    /// Out of rotation (destroyed or switched off).
    Disabled,
}

impl fmt::Display for CoverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoverState::Available => "Available",
            CoverState::Occupied => "Occupied",
            CoverState::Reserved => "Reserved",
            CoverState::Disabled => "Disabled",
        };
        f.write_str(s)
    }
}

/// Cover-related state of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitCoverState {
    /// Not interested in cover.
    #[default]
    Idle,
    /// Looking for cover, or moving to a reserved point.
    SeekingCover,
    /// Occupying a cover point.
    InCover,
}

/// Battlefield role of a unit. Drives its base cover priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    #[default]
    Rifleman,
    Support,
    Medic,
    Engineer,
    Sniper,
    Officer,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Setup,
    Active,
    Paused,
    MissionComplete,
}

/// Built-in scenario selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioId {
    /// One squad, plenty of cover.
    #[default]
    Skirmish,
    /// Two squads competing for a handful of single-slot points.
    Contested,
    /// A garrisoned building plus fragile light cover.
    Siege,
}

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}
