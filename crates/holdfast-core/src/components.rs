//! ECS components for hecs unit entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{CoverPointId, UnitId};

/// Identity of a unit entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    /// Display name used by diagnostics.
    pub name: String,
    /// Squad the unit belongs to.
    pub squad: u32,
}

/// Attributes that feed the unit's cover priority score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitProfile {
    pub role: UnitRole,
    pub squad_leader: bool,
    pub specialist: bool,
    /// Completed missions.
    pub experience: u32,
}

/// Current health (0.0 = dead, UNIT_MAX_HEALTH = unhurt).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health(pub f64);

/// Cover bookkeeping on the unit side.
///
/// `cover` is a non-owning back-reference: the cover point owns the slot
/// record, the unit only remembers which point it went to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverLink {
    pub state: UnitCoverState,
    /// Point currently reserved or occupied, if any.
    pub cover: Option<CoverPointId>,
    /// Tick at which the current state began.
    pub state_start_tick: u64,
    /// Earliest tick for the next search after a failed one.
    pub retry_at_tick: u64,
    /// Set by an explicit order to seek cover without a threat present.
    #[serde(default)]
    pub ordered: bool,
}

/// Marks a unit as dead. Cleanup abandons its cover and despawns it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dead;
