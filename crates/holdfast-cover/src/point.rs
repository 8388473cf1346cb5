//! Cover point: one cover location's capacity, occupants and reservations.
//!
//! All mutations of a point run under that point's own lock. The occupied-slot
//! count is never stored: it is always derived from the two backing lists, so
//! the count reported to callers cannot drift from the lists it describes.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use holdfast_core::constants::*;
use holdfast_core::enums::{CoverQuality, CoverState};
use holdfast_core::error::CoverError;
use holdfast_core::events::CoverEvent;
use holdfast_core::types::{angle_between, CoverPointId, Position, UnitId};

use crate::bus::CoverEventBus;

/// Static description of a cover point, as authored in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverPointDef {
    pub id: CoverPointId,
    pub position: Position,
    /// Bearing the protection faces (radians, 0 = North, clockwise).
    #[serde(default)]
    pub facing: f64,
    /// Full width of the protected arc (radians).
    #[serde(default = "default_protection_arc")]
    pub protection_arc: f64,
    #[serde(default)]
    pub quality: CoverQuality,
    #[serde(default = "default_max_occupants")]
    pub max_occupants: u32,
    /// Fraction of the reduction kept against threats outside the arc.
    #[serde(default = "default_flank_factor")]
    pub flank_factor: f64,
}

fn default_protection_arc() -> f64 {
    DEFAULT_PROTECTION_ARC
}

fn default_max_occupants() -> u32 {
    DEFAULT_MAX_OCCUPANTS
}

fn default_flank_factor() -> f64 {
    DEFAULT_FLANK_FACTOR
}

impl CoverPointDef {
    /// A single-slot point with default arc and flank factor.
    pub fn new(id: CoverPointId, position: Position, quality: CoverQuality) -> Self {
        Self {
            id,
            position,
            facing: 0.0,
            protection_arc: DEFAULT_PROTECTION_ARC,
            quality,
            max_occupants: DEFAULT_MAX_OCCUPANTS,
            flank_factor: DEFAULT_FLANK_FACTOR,
        }
    }

    pub fn with_capacity(mut self, max_occupants: u32) -> Self {
        self.max_occupants = max_occupants;
        self
    }

    pub fn facing(mut self, facing: f64, protection_arc: f64) -> Self {
        self.facing = facing;
        self.protection_arc = protection_arc;
        self
    }

    pub fn with_flank_factor(mut self, flank_factor: f64) -> Self {
        self.flank_factor = flank_factor;
        self
    }

    fn validate(&self) -> Result<(), CoverError> {
        let invalid = |msg: String| Err(CoverError::InvalidConfiguration(msg));
        if self.max_occupants < 1 {
            return invalid(format!("{}: max_occupants must be at least 1", self.id));
        }
        let p = self.position;
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return invalid(format!("{}: position is not finite", self.id));
        }
        if !self.facing.is_finite() {
            return invalid(format!("{}: facing is not finite", self.id));
        }
        if !(self.protection_arc > 0.0 && self.protection_arc <= std::f64::consts::TAU) {
            return invalid(format!(
                "{}: protection arc {} outside (0, 2π]",
                self.id, self.protection_arc
            ));
        }
        if !(0.0..=1.0).contains(&self.flank_factor) {
            return invalid(format!(
                "{}: flank factor {} outside [0, 1]",
                self.id, self.flank_factor
            ));
        }
        Ok(())
    }
}

/// Result of a successful occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupyOutcome {
    /// The unit's reservation here was converted. Slot count unchanged.
    FromReservation,
    /// The unit was admitted without a prior reservation.
    Direct,
    /// The unit was already occupying (only from `occupy_reserved`).
    AlreadyOccupying,
}

/// Result of a release. Releasing a unit that holds nothing is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    ReleasedOccupant,
    ReleasedReservation,
    NotHeld,
}

impl ReleaseOutcome {
    pub fn released(self) -> bool {
        !matches!(self, ReleaseOutcome::NotHeld)
    }

    /// Turn a benign no-op into `AlreadyReleased`, for callers that expected
    /// the unit to be holding the slot.
    pub fn require_released(self, point: CoverPointId, unit: UnitId) -> Result<Self, CoverError> {
        match self {
            ReleaseOutcome::NotHeld => Err(CoverError::AlreadyReleased { point, unit }),
            other => Ok(other),
        }
    }
}

/// Immutable copy of a point's slot record, taken under its lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverPointSnapshot {
    pub id: CoverPointId,
    pub position: Position,
    pub quality: CoverQuality,
    pub state: CoverState,
    pub max_occupants: u32,
    pub occupants: Vec<UnitId>,
    pub reservations: Vec<UnitId>,
}

impl CoverPointSnapshot {
    pub fn occupied_slots(&self) -> u32 {
        (self.occupants.len() + self.reservations.len()) as u32
    }

    pub fn available_slots(&self) -> u32 {
        self.max_occupants.saturating_sub(self.occupied_slots())
    }

    pub fn is_available(&self) -> bool {
        self.available_slots() > 0 && self.state != CoverState::Disabled
    }

    /// Every slot holder: occupants first, then reservations.
    pub fn holders(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.occupants.iter().chain(self.reservations.iter()).copied()
    }
}

#[derive(Debug)]
struct Slots {
    max_occupants: u32,
    occupants: Vec<UnitId>,
    reservations: Vec<UnitId>,
    disabled: bool,
}

impl Slots {
    fn occupied(&self) -> u32 {
        (self.occupants.len() + self.reservations.len()) as u32
    }

    fn has_free_slot(&self) -> bool {
        self.occupied() < self.max_occupants
    }

    fn holds(&self, unit: UnitId) -> bool {
        self.occupants.contains(&unit) || self.reservations.contains(&unit)
    }

    fn state(&self) -> CoverState {
        if self.disabled {
            CoverState::Disabled
        } else if self.has_free_slot() {
            CoverState::Available
        } else if !self.occupants.is_empty() {
            CoverState::Occupied
        } else {
            CoverState::Reserved
        }
    }

    fn remove(list: &mut Vec<UnitId>, unit: UnitId) -> bool {
        match list.iter().position(|u| *u == unit) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Panics on a broken invariant. These are programming defects, never
    /// conditions to correct silently.
    fn assert_invariants(&self, id: CoverPointId) {
        assert!(
            self.occupied() <= self.max_occupants,
            "{id}: {} occupants + {} reservations exceed capacity {}",
            self.occupants.len(),
            self.reservations.len(),
            self.max_occupants
        );
        for unit in &self.occupants {
            assert!(
                !self.reservations.contains(unit),
                "{id}: {unit} is both occupying and reserved"
            );
            assert!(
                self.occupants.iter().filter(|u| *u == unit).count() == 1,
                "{id}: {unit} occupies more than one slot"
            );
        }
        for unit in &self.reservations {
            assert!(
                self.reservations.iter().filter(|u| *u == unit).count() == 1,
                "{id}: {unit} holds more than one reservation"
            );
        }
    }
}

/// A physical cover location with limited simultaneous-use capacity.
pub struct CoverPoint {
    id: CoverPointId,
    position: Position,
    facing: f64,
    protection_arc: f64,
    quality: CoverQuality,
    flank_factor: f64,
    slots: Mutex<Slots>,
    events: Arc<CoverEventBus>,
}

impl std::fmt::Debug for CoverPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverPoint")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("quality", &self.quality)
            .field("slots", &*self.slots.lock())
            .finish()
    }
}

impl CoverPoint {
    /// Create a point whose events go to a private bus nobody listens to.
    pub fn new(def: CoverPointDef) -> Result<Self, CoverError> {
        Self::with_events(def, Arc::new(CoverEventBus::new()))
    }

    /// Create a point that publishes to `events`.
    pub fn with_events(def: CoverPointDef, events: Arc<CoverEventBus>) -> Result<Self, CoverError> {
        def.validate()?;
        Ok(Self {
            id: def.id,
            position: def.position,
            facing: def.facing.rem_euclid(std::f64::consts::TAU),
            protection_arc: def.protection_arc,
            quality: def.quality,
            flank_factor: def.flank_factor,
            slots: Mutex::new(Slots {
                max_occupants: def.max_occupants,
                occupants: Vec::new(),
                reservations: Vec::new(),
                disabled: false,
            }),
            events,
        })
    }

    pub fn id(&self) -> CoverPointId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn quality(&self) -> CoverQuality {
        self.quality
    }

    pub fn facing(&self) -> f64 {
        self.facing
    }

    /// Run a mutation under the point's lock, then publish its events.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Slots, &mut Vec<CoverEvent>) -> Result<R, CoverError>,
    ) -> Result<R, CoverError> {
        let mut events = Vec::new();
        let result = {
            let mut slots = self.slots.lock();
            let before = slots.state();
            let result = f(&mut slots, &mut events);
            let after = slots.state();
            if before != after {
                events.push(CoverEvent::StateChanged {
                    point: self.id,
                    old: before,
                    new: after,
                });
            }
            slots.assert_invariants(self.id);
            result
        };
        self.events.publish(&events);
        result
    }

    /// Claim a future slot for `unit`.
    pub fn reserve(&self, unit: UnitId) -> Result<(), CoverError> {
        let point = self.id;
        self.mutate(|slots, events| {
            if slots.disabled {
                return Err(CoverError::Disabled { point });
            }
            if slots.holds(unit) {
                return Err(CoverError::AlreadyClaimed { point, unit });
            }
            if !slots.has_free_slot() {
                return Err(CoverError::CapacityExceeded { point, unit });
            }
            slots.reservations.push(unit);
            debug!(%point, %unit, slots = slots.occupied(), "reserved");
            events.push(CoverEvent::Reserved { point, unit });
            Ok(())
        })
    }

    /// Move `unit` into the point. A reservation held here is converted
    /// without changing the slot count; otherwise the unit is admitted
    /// exactly like [`CoverPoint::reserve`].
    pub fn occupy(&self, unit: UnitId) -> Result<OccupyOutcome, CoverError> {
        let point = self.id;
        self.mutate(|slots, events| {
            if slots.disabled {
                return Err(CoverError::Disabled { point });
            }
            if slots.occupants.contains(&unit) {
                return Err(CoverError::AlreadyClaimed { point, unit });
            }
            if Slots::remove(&mut slots.reservations, unit) {
                slots.occupants.push(unit);
                debug!(%point, %unit, slots = slots.occupied(), "reservation converted to occupancy");
                events.push(CoverEvent::ReservationCleared { point, unit });
                events.push(CoverEvent::Occupied { point, unit });
                return Ok(OccupyOutcome::FromReservation);
            }
            if !slots.has_free_slot() {
                return Err(CoverError::CapacityExceeded { point, unit });
            }
            slots.occupants.push(unit);
            debug!(%point, %unit, slots = slots.occupied(), "occupied without reservation");
            events.push(CoverEvent::Occupied { point, unit });
            Ok(OccupyOutcome::Direct)
        })
    }

    /// Like [`CoverPoint::occupy`], but only for a unit that already holds a
    /// slot here. A revoked reservation fails with `NotReserved` instead of
    /// being turned into a fresh admission.
    pub fn occupy_reserved(&self, unit: UnitId) -> Result<OccupyOutcome, CoverError> {
        let point = self.id;
        self.mutate(|slots, events| {
            // Disabling keeps occupants, so one already here stays put.
            if slots.occupants.contains(&unit) {
                return Ok(OccupyOutcome::AlreadyOccupying);
            }
            if slots.disabled {
                return Err(CoverError::Disabled { point });
            }
            if !Slots::remove(&mut slots.reservations, unit) {
                return Err(CoverError::NotReserved { point, unit });
            }
            slots.occupants.push(unit);
            debug!(%point, %unit, slots = slots.occupied(), "reservation converted to occupancy");
            events.push(CoverEvent::ReservationCleared { point, unit });
            events.push(CoverEvent::Occupied { point, unit });
            Ok(OccupyOutcome::FromReservation)
        })
    }

    /// Remove `unit` from whichever list holds it. Idempotent.
    pub fn release(&self, unit: UnitId) -> ReleaseOutcome {
        let point = self.id;
        let outcome = self.mutate(|slots, events| {
            let outcome = if Slots::remove(&mut slots.occupants, unit) {
                ReleaseOutcome::ReleasedOccupant
            } else if Slots::remove(&mut slots.reservations, unit) {
                ReleaseOutcome::ReleasedReservation
            } else {
                return Ok(ReleaseOutcome::NotHeld);
            };
            debug!(%point, %unit, slots = slots.occupied(), ?outcome, "released");
            events.push(CoverEvent::Vacated { point, unit });
            Ok(outcome)
        });
        outcome.unwrap_or(ReleaseOutcome::NotHeld)
    }

    /// Clear every slot holder, notifying each. Returns the evicted units,
    /// occupants first.
    pub fn force_release_all(&self) -> Vec<UnitId> {
        let point = self.id;
        let evicted = self.mutate(|slots, events| {
            let mut evicted = std::mem::take(&mut slots.occupants);
            evicted.append(&mut slots.reservations);
            for unit in &evicted {
                events.push(CoverEvent::Vacated { point, unit: *unit });
            }
            if !evicted.is_empty() {
                debug!(%point, count = evicted.len(), "force-released all holders");
            }
            Ok(evicted)
        });
        evicted.unwrap_or_default()
    }

    /// Take the point out of rotation. Current holders stay recorded.
    /// Returns false if it was already disabled.
    pub fn disable(&self) -> bool {
        let point = self.id;
        self.mutate(|slots, events| {
            if slots.disabled {
                return Ok(false);
            }
            slots.disabled = true;
            debug!(%point, "disabled");
            events.push(CoverEvent::Disabled { point });
            Ok(true)
        })
        .unwrap_or(false)
    }

    /// Put the point back into rotation. Returns false if it was not disabled.
    pub fn enable(&self) -> bool {
        let point = self.id;
        self.mutate(|slots, events| {
            if !slots.disabled {
                return Ok(false);
            }
            slots.disabled = false;
            debug!(%point, "enabled");
            events.push(CoverEvent::Enabled { point });
            Ok(true)
        })
        .unwrap_or(false)
    }

    /// Explicitly change the capacity. Never shrinks below the slots in use.
    pub fn reconfigure_capacity(&self, max_occupants: u32) -> Result<(), CoverError> {
        let point = self.id;
        self.mutate(|slots, _events| {
            if max_occupants < 1 {
                return Err(CoverError::InvalidConfiguration(format!(
                    "{point}: max_occupants must be at least 1"
                )));
            }
            // The first holder past the new limit is the one left without a slot.
            if let Some(&unit) = slots
                .occupants
                .iter()
                .chain(&slots.reservations)
                .nth(max_occupants as usize)
            {
                return Err(CoverError::CapacityExceeded { point, unit });
            }
            slots.max_occupants = max_occupants;
            Ok(())
        })
    }

    /// Live `occupants + reservations`.
    pub fn occupied_slots(&self) -> u32 {
        self.slots.lock().occupied()
    }

    pub fn max_occupants(&self) -> u32 {
        self.slots.lock().max_occupants
    }

    pub fn available_slots(&self) -> u32 {
        let slots = self.slots.lock();
        slots.max_occupants.saturating_sub(slots.occupied())
    }

    pub fn is_available(&self) -> bool {
        let slots = self.slots.lock();
        slots.has_free_slot() && !slots.disabled
    }

    pub fn state(&self) -> CoverState {
        self.slots.lock().state()
    }

    /// Whether `unit` occupies or has reserved a slot here.
    pub fn holds(&self, unit: UnitId) -> bool {
        self.slots.lock().holds(unit)
    }

    pub fn snapshot(&self) -> CoverPointSnapshot {
        let slots = self.slots.lock();
        CoverPointSnapshot {
            id: self.id,
            position: self.position,
            quality: self.quality,
            state: slots.state(),
            max_occupants: slots.max_occupants,
            occupants: slots.occupants.clone(),
            reservations: slots.reservations.clone(),
        }
    }

    /// Damage-reduction fraction against a threat at `threat_bearing`
    /// (bearing from this point toward the threat). `None` means no known
    /// direction and yields the full value.
    pub fn effectiveness(&self, threat_bearing: Option<f64>) -> f64 {
        let base = self.quality.damage_reduction();
        match threat_bearing {
            None => base,
            Some(_) if self.quality.is_omnidirectional() => base,
            Some(bearing) if angle_between(bearing, self.facing) <= self.protection_arc / 2.0 => {
                base
            }
            Some(_) => base * self.flank_factor,
        }
    }

    /// Effectiveness against a threat located at `threat`.
    pub fn effectiveness_against(&self, threat: &Position) -> f64 {
        self.effectiveness(Some(self.position.bearing_to(threat)))
    }
}
