//! Console rendering of snapshots and cover events.

use holdfast_core::events::CoverEvent;
use holdfast_core::state::SimSnapshot;

/// One-line status for a snapshot.
pub fn status_line(snapshot: &SimSnapshot) -> String {
    let s = &snapshot.summary;
    format!(
        "[t={:>6.2}s] in cover {}/{} | seeking {} | lost {} | points disabled {}",
        snapshot.time.elapsed_secs,
        s.units_in_cover,
        s.units_total,
        s.units_seeking,
        s.units_lost,
        s.points_disabled
    )
}

/// One line per cover event.
pub fn event_line(tick: u64, event: &CoverEvent) -> String {
    let body = match event {
        CoverEvent::Reserved { point, unit } => format!("{unit} reserved {point}"),
        CoverEvent::ReservationCleared { point, unit } => {
            format!("{unit} reservation at {point} consumed")
        }
        CoverEvent::Occupied { point, unit } => format!("{unit} occupied {point}"),
        CoverEvent::Vacated { point, unit } => format!("{unit} left {point}"),
        CoverEvent::StateChanged { point, old, new } => format!("{point} {old} -> {new}"),
        CoverEvent::Disabled { point } => format!("{point} disabled"),
        CoverEvent::Enabled { point } => format!("{point} enabled"),
    };
    format!("[tick {tick:>5}] {body}")
}

/// End-of-run summary with each unit's final state.
pub fn summary(snapshot: &SimSnapshot) -> String {
    let mut lines = vec![status_line(snapshot)];
    for unit in &snapshot.units {
        let cover = unit
            .cover
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        lines.push(format!(
            "  {:<16} {:<9} {:?} at {} (hp {:.0}, priority {:.1})",
            unit.name,
            format!("{:?}", unit.role),
            unit.state,
            cover,
            unit.health,
            unit.priority
        ));
    }
    lines.join("\n")
}
