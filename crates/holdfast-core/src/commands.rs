//! Commands sent from the host (player input, scripted events) to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::types::{CoverPointId, Position, UnitId};

/// All possible external actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UnitCommand {
    // --- Simulation control ---
    /// Spawn the scenario and start ticking.
    StartMission,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,

    // --- Threat ---
    /// Place (or move) the enemy threat.
    SetThreat { position: Position },
    /// Remove the threat; units stay where they are.
    ClearThreat,

    // --- Unit orders ---
    /// Order a unit to look for cover even without a threat.
    OrderSeekCover { unit: UnitId },
    /// Order a unit to leave its cover (or cancel its reservation).
    OrderAbandonCover { unit: UnitId },
    /// Apply raw damage to a unit; cover effectiveness reduces it.
    DamageUnit { unit: UnitId, amount: f64 },
    /// Kill a unit outright.
    KillUnit { unit: UnitId },

    // --- Cover geometry ---
    /// Destroy a cover point's geometry. Holders are forced out.
    DestroyCover { point: CoverPointId },
    /// Put a disabled cover point back into rotation.
    RestoreCover { point: CoverPointId },
}
