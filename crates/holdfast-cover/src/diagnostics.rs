//! Console diagnostic dump of cover point occupancy.
//!
//! The "OccupyingUnits" array lists every slot holder (occupants, then
//! reservations), so its size always matches `GetOccupiedSlots()`.

use std::collections::HashMap;
use std::fmt::Write;

use holdfast_core::types::UnitId;

use crate::point::CoverPointSnapshot;
use crate::registry::CoverRegistry;

/// Resolves unit ids to display names. `None` marks a stale id.
pub trait UnitDirectory {
    fn unit_name(&self, unit: UnitId) -> Option<String>;
}

impl UnitDirectory for HashMap<UnitId, String> {
    fn unit_name(&self, unit: UnitId) -> Option<String> {
        self.get(&unit).cloned()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

/// Render one point's block.
pub fn dump_point(snapshot: &CoverPointSnapshot, units: &dyn UnitDirectory) -> String {
    let holders: Vec<UnitId> = snapshot.holders().collect();
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Cover Point: {}", snapshot.id);
    let _ = writeln!(out, "OccupyingUnits Array Size: {}", holders.len());
    let _ = writeln!(out, "GetOccupiedSlots() returns: {}", snapshot.occupied_slots());
    let _ = writeln!(out, "GetMaxOccupants() returns: {}", snapshot.max_occupants);
    let _ = writeln!(out, "GetAvailableSlots() returns: {}", snapshot.available_slots());
    for (index, unit) in holders.iter().enumerate() {
        let (name, valid) = match units.unit_name(*unit) {
            Some(name) => (name, true),
            None => (unit.to_string(), false),
        };
        let _ = writeln!(out, "  Unit {index}: {name} (Valid: {})", yes_no(valid));
    }
    let _ = writeln!(out, "Cover State: {}", snapshot.state);
    let _ = writeln!(out, "Is Available: {}", yes_no(snapshot.is_available()));
    out
}

/// Render every registered point, ordered by id, blocks separated by a blank line.
pub fn dump_registry(registry: &CoverRegistry, units: &dyn UnitDirectory) -> String {
    registry
        .snapshots()
        .iter()
        .map(|snapshot| dump_point(snapshot, units))
        .collect::<Vec<_>>()
        .join("\n")
}
