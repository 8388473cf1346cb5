//! Cover registry: indexes every cover point in the world and answers
//! spatial queries over them.
//!
//! The registry lock only guards the id → point map. It is never held while a
//! point's own lock is taken, and ranking runs on a copied candidate list.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use holdfast_core::constants::{RANK_WEIGHT_DISTANCE, RANK_WEIGHT_EFFECTIVENESS};
use holdfast_core::error::CoverError;
use holdfast_core::types::{CoverPointId, Position, UnitId};

use crate::bus::CoverEventBus;
use crate::point::{CoverPoint, CoverPointDef, CoverPointSnapshot};

/// Where the threat is, as far as ranking is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ThreatDirection {
    /// No known threat; every point counts at full value.
    #[default]
    Unknown,
    /// Threat lies along this bearing from every point (distant threat).
    Bearing(f64),
    /// Threat sits at a position; the bearing is taken per point.
    From(Position),
}

impl ThreatDirection {
    /// Bearing from `point` toward the threat.
    pub fn bearing_from(&self, point: &Position) -> Option<f64> {
        match self {
            ThreatDirection::Unknown => None,
            ThreatDirection::Bearing(b) => Some(*b),
            ThreatDirection::From(threat) => Some(point.bearing_to(threat)),
        }
    }

    pub fn effectiveness_of(&self, point: &CoverPoint) -> f64 {
        point.effectiveness(self.bearing_from(&point.position()))
    }
}

/// Candidate-ranking policy. Higher score wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingWeights {
    pub effectiveness: f64,
    /// Penalty per unit of `distance / radius`.
    pub distance: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            effectiveness: RANK_WEIGHT_EFFECTIVENESS,
            distance: RANK_WEIGHT_DISTANCE,
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    point: Arc<CoverPoint>,
    distance: f64,
}

/// Points within a radius, ordered by ascending distance then id.
///
/// Iteration is lazy: availability is checked as each point is reached, so a
/// point filled after the set was built is skipped. `iter` may be called any
/// number of times.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CoverPoint>> + '_ {
        self.candidates
            .iter()
            .filter(|c| c.point.is_available())
            .map(|c| &c.point)
    }

    /// Like `iter`, with each point's distance from the query origin.
    pub fn iter_with_distance(&self) -> impl Iterator<Item = (&Arc<CoverPoint>, f64)> + '_ {
        self.candidates
            .iter()
            .filter(|c| c.point.is_available())
            .map(|c| (&c.point, c.distance))
    }

    /// Points in range regardless of availability.
    pub fn in_range(&self) -> usize {
        self.candidates.len()
    }
}

/// A scored candidate from [`CoverRegistry::rank_candidates`].
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub point: Arc<CoverPoint>,
    pub distance: f64,
    pub effectiveness: f64,
    pub score: f64,
}

/// Index of every cover point in the world.
pub struct CoverRegistry {
    points: RwLock<HashMap<CoverPointId, Arc<CoverPoint>>>,
    events: Arc<CoverEventBus>,
    weights: RankingWeights,
}

impl Default for CoverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverRegistry {
    pub fn new() -> Self {
        Self::with_weights(RankingWeights::default())
    }

    pub fn with_weights(weights: RankingWeights) -> Self {
        Self {
            points: RwLock::new(HashMap::new()),
            events: Arc::new(CoverEventBus::new()),
            weights,
        }
    }

    /// Bus that points spawned through this registry publish to.
    pub fn events(&self) -> &Arc<CoverEventBus> {
        &self.events
    }

    pub fn weights(&self) -> RankingWeights {
        self.weights
    }

    /// Build a point wired to this registry's event bus and register it.
    pub fn spawn(&self, def: CoverPointDef) -> Result<Arc<CoverPoint>, CoverError> {
        let point = Arc::new(CoverPoint::with_events(def, Arc::clone(&self.events))?);
        self.register(Arc::clone(&point))?;
        Ok(point)
    }

    pub fn register(&self, point: Arc<CoverPoint>) -> Result<(), CoverError> {
        let id = point.id();
        let mut points = self.points.write();
        if points.contains_key(&id) {
            return Err(CoverError::DuplicateCoverPoint(id));
        }
        points.insert(id, point);
        info!(point = %id, total = points.len(), "cover point registered");
        Ok(())
    }

    /// Remove a point. It is disabled and every holder force-released (and
    /// notified) before it leaves the index. Returns the evicted units.
    pub fn unregister(&self, id: CoverPointId) -> Result<Vec<UnitId>, CoverError> {
        let point = self.get(id).ok_or(CoverError::UnknownCoverPoint(id))?;
        point.disable();
        let evicted = point.force_release_all();
        self.points.write().remove(&id);
        info!(point = %id, evicted = evicted.len(), "cover point unregistered");
        Ok(evicted)
    }

    pub fn get(&self, id: CoverPointId) -> Option<Arc<CoverPoint>> {
        self.points.read().get(&id).cloned()
    }

    pub fn contains(&self, id: CoverPointId) -> bool {
        self.points.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().is_empty()
    }

    /// Every registered id, ascending.
    pub fn ids(&self) -> Vec<CoverPointId> {
        let mut ids: Vec<CoverPointId> = self.points.read().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Every registered point, ordered by id.
    pub fn all(&self) -> Vec<Arc<CoverPoint>> {
        let mut points: Vec<Arc<CoverPoint>> = self.points.read().values().cloned().collect();
        points.sort_by_key(|p| p.id());
        points
    }

    /// Consistent per-point snapshots, ordered by id.
    pub fn snapshots(&self) -> Vec<CoverPointSnapshot> {
        self.all().iter().map(|p| p.snapshot()).collect()
    }

    /// Points currently holding `unit`. More than one entry means a caller
    /// bypassed the coordinator.
    pub fn points_holding(&self, unit: UnitId) -> Vec<CoverPointId> {
        self.all()
            .iter()
            .filter(|p| p.holds(unit))
            .map(|p| p.id())
            .collect()
    }

    /// Available points within `radius` of `origin`, nearest first.
    pub fn find_available_within_radius(&self, origin: &Position, radius: f64) -> CandidateSet {
        if radius.is_nan() || radius < 0.0 {
            return CandidateSet::default();
        }
        let mut candidates: Vec<Candidate> = self
            .points
            .read()
            .values()
            .filter_map(|point| {
                let distance = origin.range_to(&point.position());
                (distance <= radius).then(|| Candidate {
                    point: Arc::clone(point),
                    distance,
                })
            })
            .collect();
        candidates.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.point.id().cmp(&b.point.id()))
        });
        CandidateSet { candidates }
    }

    /// Available points in range, best first. Points already holding `unit`
    /// are skipped. The order is total: score, then distance, then id.
    pub fn rank_candidates(
        &self,
        unit: UnitId,
        threat: ThreatDirection,
        origin: &Position,
        radius: f64,
    ) -> Vec<RankedCandidate> {
        let set = self.find_available_within_radius(origin, radius);
        let mut ranked: Vec<RankedCandidate> = set
            .iter_with_distance()
            .filter(|(point, _)| !point.holds(unit))
            .map(|(point, distance)| {
                let effectiveness = threat.effectiveness_of(point);
                let normalized = if radius > 0.0 { distance / radius } else { 0.0 };
                let score =
                    self.weights.effectiveness * effectiveness - self.weights.distance * normalized;
                RankedCandidate {
                    point: Arc::clone(point),
                    distance,
                    effectiveness,
                    score,
                }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.distance.total_cmp(&b.distance))
                .then_with(|| a.point.id().cmp(&b.point.id()))
        });
        ranked
    }

    /// The single best available point for `unit`, if any is in range.
    pub fn find_best_for(
        &self,
        unit: UnitId,
        threat: ThreatDirection,
        origin: &Position,
        radius: f64,
    ) -> Option<Arc<CoverPoint>> {
        self.rank_candidates(unit, threat, origin, radius)
            .into_iter()
            .next()
            .map(|c| c.point)
    }
}
