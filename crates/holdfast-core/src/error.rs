//! Error kinds surfaced by cover operations.

use thiserror::Error;

use crate::types::{CoverPointId, UnitId};

/// Failure of a cover point, registry or coordinator operation.
///
/// Every variant is local and recoverable from the caller's point of view.
/// Internal invariant breaches are assertion failures, never a variant here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoverError {
    #[error("{point} has no free slot for {unit}")]
    CapacityExceeded { point: CoverPointId, unit: UnitId },

    #[error("{unit} already holds a slot at {point}")]
    AlreadyClaimed { point: CoverPointId, unit: UnitId },

    #[error("{point} is disabled")]
    Disabled { point: CoverPointId },

    #[error("{unit} holds no reservation at {point}")]
    NotReserved { point: CoverPointId, unit: UnitId },

    #[error("{unit} was already released from {point}")]
    AlreadyReleased { point: CoverPointId, unit: UnitId },

    #[error("invalid cover configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{0} is not registered")]
    UnknownCoverPoint(CoverPointId),

    #[error("{0} is already registered")]
    DuplicateCoverPoint(CoverPointId),
}

impl CoverError {
    /// Whether a caller should move on to the next candidate.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoverError::CapacityExceeded { .. } | CoverError::Disabled { .. }
        )
    }
}
