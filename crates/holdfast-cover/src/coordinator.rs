//! Cover assignment coordinator: arbitrates competing cover requests.
//!
//! Each unit has its own claim record, locked for the whole of any operation
//! on that unit. Lock order is always unit claim → cover point; a cover point
//! never waits on a unit claim, so the two levels cannot deadlock. The claim
//! record is what keeps a unit in at most one cover point system-wide.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use holdfast_core::error::CoverError;
use holdfast_core::types::{CoverPointId, Position, UnitId};

use crate::point::{CoverPoint, OccupyOutcome, ReleaseOutcome};
use crate::registry::{CoverRegistry, ThreatDirection};

/// One unit's request for cover.
#[derive(Debug, Clone, Copy)]
pub struct CoverRequest {
    pub unit: UnitId,
    /// Higher wins when requests for the same point arrive together.
    pub priority: f64,
    pub threat: ThreatDirection,
    pub origin: Position,
    pub radius: f64,
}

/// Result of one request. `Ok(None)` means nothing in range admitted the unit.
pub type CoverAssignment = Result<Option<Arc<CoverPoint>>, CoverError>;

type ClaimSlot = Arc<Mutex<Option<CoverPointId>>>;

/// Serializes claims so no two units end up in the same slot and no unit
/// holds two points.
pub struct CoverAssignmentCoordinator {
    registry: Arc<CoverRegistry>,
    claims: RwLock<HashMap<UnitId, ClaimSlot>>,
}

impl CoverAssignmentCoordinator {
    pub fn new(registry: Arc<CoverRegistry>) -> Self {
        Self {
            registry,
            claims: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<CoverRegistry> {
        &self.registry
    }

    fn claim_slot(&self, unit: UnitId) -> ClaimSlot {
        if let Some(slot) = self.claims.read().get(&unit) {
            return Arc::clone(slot);
        }
        Arc::clone(self.claims.write().entry(unit).or_default())
    }

    /// Resolve the recorded claim, dropping it if the point is gone or no
    /// longer holds the unit (force-released, unregistered).
    fn live_claim(&self, unit: UnitId, claim: &mut Option<CoverPointId>) -> Option<Arc<CoverPoint>> {
        let id = (*claim)?;
        match self.registry.get(id) {
            Some(point) if point.holds(unit) => Some(point),
            _ => {
                debug!(%unit, point = %id, "discarding stale claim");
                *claim = None;
                None
            }
        }
    }

    /// The point `unit` currently holds through this coordinator.
    pub fn claim_of(&self, unit: UnitId) -> Option<CoverPointId> {
        let slot = self.claim_slot(unit);
        let mut claim = slot.lock();
        self.live_claim(unit, &mut claim).map(|p| p.id())
    }

    /// Reserve the best available point for `request.unit`.
    ///
    /// Candidates are tried best-first; a candidate that fills up or is
    /// disabled before the unit gets to it is skipped.
    pub fn request_cover(&self, request: &CoverRequest) -> CoverAssignment {
        let unit = request.unit;
        let slot = self.claim_slot(unit);
        let mut claim = slot.lock();

        if let Some(held) = self.live_claim(unit, &mut claim) {
            return Err(CoverError::AlreadyClaimed {
                point: held.id(),
                unit,
            });
        }
        // A slot taken directly on a point counts too. Adopt it so abandon
        // and confirm_arrival find it.
        if let Some(&held) = self.registry.points_holding(unit).first() {
            *claim = Some(held);
            return Err(CoverError::AlreadyClaimed { point: held, unit });
        }

        let ranked =
            self.registry
                .rank_candidates(unit, request.threat, &request.origin, request.radius);
        let considered = ranked.len();

        for candidate in ranked {
            let point = candidate.point;
            match point.reserve(unit) {
                Ok(()) => {
                    *claim = Some(point.id());
                    debug!(
                        %unit,
                        point = %point.id(),
                        priority = request.priority,
                        score = candidate.score,
                        "cover reserved"
                    );
                    return Ok(Some(point));
                }
                Err(err) if err.is_recoverable() => {
                    debug!(%unit, point = %point.id(), %err, "candidate lost, trying next");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(%unit, considered, radius = request.radius, "no cover available");
        Ok(None)
    }

    /// Resolve a burst of simultaneous requests, highest priority first
    /// (ties by unit id). Results come back in that order.
    pub fn request_cover_batch(
        &self,
        mut requests: Vec<CoverRequest>,
    ) -> Vec<(UnitId, CoverAssignment)> {
        requests.sort_by(|a, b| {
            b.priority
                .total_cmp(&a.priority)
                .then_with(|| a.unit.cmp(&b.unit))
        });
        requests
            .iter()
            .map(|request| (request.unit, self.request_cover(request)))
            .collect()
    }

    /// The unit reached `point_id`; turn its reservation into occupancy.
    ///
    /// On failure the unit's slot there is given up and its claim cleared, so
    /// it can go straight back to [`request_cover`](Self::request_cover).
    pub fn confirm_arrival(
        &self,
        unit: UnitId,
        point_id: CoverPointId,
    ) -> Result<OccupyOutcome, CoverError> {
        let slot = self.claim_slot(unit);
        let mut claim = slot.lock();

        if *claim != Some(point_id) {
            return Err(CoverError::NotReserved {
                point: point_id,
                unit,
            });
        }
        let Some(point) = self.registry.get(point_id) else {
            *claim = None;
            return Err(CoverError::UnknownCoverPoint(point_id));
        };

        match point.occupy_reserved(unit) {
            Ok(outcome) => {
                debug!(%unit, point = %point_id, ?outcome, "arrival confirmed");
                Ok(outcome)
            }
            Err(err) => {
                point.release(unit);
                *claim = None;
                debug!(%unit, point = %point_id, %err, "arrival rejected");
                Err(err)
            }
        }
    }

    /// Give up whatever `unit` holds. Always safe, including when it holds
    /// nothing or a concurrent call already released it.
    pub fn abandon(&self, unit: UnitId) -> ReleaseOutcome {
        let slot = self.claim_slot(unit);
        let mut claim = slot.lock();

        if let Some(point_id) = claim.take() {
            if let Some(point) = self.registry.get(point_id) {
                let outcome = point.release(unit);
                debug!(%unit, point = %point_id, ?outcome, "abandoned");
                return outcome;
            }
            return ReleaseOutcome::NotHeld;
        }

        // Nothing recorded; sweep for slots taken directly on a point.
        let mut outcome = ReleaseOutcome::NotHeld;
        for point_id in self.registry.points_holding(unit) {
            if let Some(point) = self.registry.get(point_id) {
                let released = point.release(unit);
                if released.released() {
                    outcome = released;
                }
            }
        }
        outcome
    }

    /// Abandon and drop the unit's claim record. Call once the unit is gone
    /// for good (destroyed), after its last cover operation.
    pub fn forget(&self, unit: UnitId) -> ReleaseOutcome {
        let outcome = self.abandon(unit);
        self.claims.write().remove(&unit);
        outcome
    }

    /// Cover geometry destroyed: disable the point and force every holder
    /// out, clearing their claims. Returns the evicted units.
    pub fn destroy_cover(&self, point_id: CoverPointId) -> Result<Vec<UnitId>, CoverError> {
        let point = self
            .registry
            .get(point_id)
            .ok_or(CoverError::UnknownCoverPoint(point_id))?;
        point.disable();
        let evicted = point.force_release_all();
        self.clear_claims(point_id, &evicted);
        Ok(evicted)
    }

    /// Put a destroyed point back into rotation.
    pub fn restore_cover(&self, point_id: CoverPointId) -> Result<bool, CoverError> {
        let point = self
            .registry
            .get(point_id)
            .ok_or(CoverError::UnknownCoverPoint(point_id))?;
        Ok(point.enable())
    }

    /// Remove a point from the world altogether.
    pub fn remove_cover(&self, point_id: CoverPointId) -> Result<Vec<UnitId>, CoverError> {
        let evicted = self.registry.unregister(point_id)?;
        self.clear_claims(point_id, &evicted);
        Ok(evicted)
    }

    /// Drop claims on `point_id` for evicted units, unless the unit has
    /// already re-claimed a slot there since the eviction.
    pub(crate) fn clear_claims(&self, point_id: CoverPointId, units: &[UnitId]) {
        let point = self.registry.get(point_id);
        for unit in units {
            let slot = self.claim_slot(*unit);
            let mut claim = slot.lock();
            let reclaimed = point.as_ref().is_some_and(|p| p.holds(*unit));
            if *claim == Some(point_id) && !reclaimed {
                *claim = None;
            }
        }
    }
}
