//! Cover occupancy and reservation for HOLDFAST.
//!
//! `CoverPoint` enforces capacity and slot bookkeeping under its own lock,
//! `CoverRegistry` indexes points and answers spatial queries, and
//! `CoverAssignmentCoordinator` arbitrates competing requests from units.

pub mod bus;
pub mod coordinator;
pub mod diagnostics;
pub mod point;
pub mod registry;

pub use bus::{CoverEventBus, EventRecorder};
pub use coordinator::{CoverAssignment, CoverAssignmentCoordinator, CoverRequest};
pub use diagnostics::{dump_point, dump_registry, UnitDirectory};
pub use holdfast_core as core;
pub use point::{CoverPoint, CoverPointDef, CoverPointSnapshot, OccupyOutcome, ReleaseOutcome};
pub use registry::{CandidateSet, CoverRegistry, RankedCandidate, RankingWeights, ThreatDirection};
