//! Tests for the simulation engine, scenarios, and the cover systems.

use std::collections::HashSet;

use holdfast_core::commands::UnitCommand;
use holdfast_core::constants::ARRIVAL_TOLERANCE;
use holdfast_core::enums::*;
use holdfast_core::error::CoverError;
use holdfast_core::events::CoverEvent;
use holdfast_core::state::SimSnapshot;
use holdfast_core::types::{CoverPointId, Position, UnitId};

use crate::engine::{SimConfig, SimulationEngine};
use crate::scenario::{build_scenario, load_scenario, parse_scenario, resolve_scenario, ScenarioConfig, ScenarioError};
use crate::systems::damage::apply_cover_damage;

fn engine_for(scenario: ScenarioConfig, seed: u64) -> SimulationEngine {
    SimulationEngine::new(SimConfig { seed, scenario }).unwrap()
}

fn started(scenario: ScenarioConfig) -> SimulationEngine {
    let mut engine = engine_for(scenario, 7);
    engine.queue_command(UnitCommand::StartMission);
    engine
}

fn run(engine: &mut SimulationEngine, ticks: usize) -> SimSnapshot {
    let mut snap = engine.tick();
    for _ in 1..ticks {
        snap = engine.tick();
    }
    snap
}

fn quiet_skirmish() -> ScenarioConfig {
    let mut scenario = build_scenario(ScenarioId::Skirmish);
    scenario.threat = None;
    scenario
}

/// Every holder recorded by a point is a live unit whose link points back.
fn assert_consistent(snap: &SimSnapshot) {
    let mut seen = HashSet::new();
    for point in &snap.cover_points {
        assert!(point.occupants.len() + point.reservations.len() <= point.max_occupants as usize);
        for unit in point.occupants.iter().chain(&point.reservations) {
            assert!(seen.insert(*unit), "{unit} holds two slots");
            let view = snap.units.iter().find(|u| u.id == *unit).unwrap();
            assert_eq!(view.cover, Some(point.id));
        }
        for unit in &point.occupants {
            let view = snap.units.iter().find(|u| u.id == *unit).unwrap();
            assert_eq!(view.state, UnitCoverState::InCover);
        }
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = started(build_scenario(ScenarioId::Contested));
    let mut engine_b = started(build_scenario(ScenarioId::Contested));

    for tick in 0..300 {
        if tick == 150 {
            engine_a.queue_command(UnitCommand::DestroyCover { point: CoverPointId(1) });
            engine_b.queue_command(UnitCommand::DestroyCover { point: CoverPointId(1) });
        }
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = engine_for(build_scenario(ScenarioId::Skirmish), 111);
    let mut engine_b = engine_for(build_scenario(ScenarioId::Skirmish), 222);
    engine_a.queue_command(UnitCommand::StartMission);
    engine_b.queue_command(UnitCommand::StartMission);

    let a = engine_a.tick();
    let b = engine_b.tick();
    let positions = |s: &SimSnapshot| s.units.iter().map(|u| u.position).collect::<Vec<_>>();
    assert_ne!(positions(&a), positions(&b), "spawn jitter should depend on seed");
}

// ---- Lifecycle ----

#[test]
fn test_start_mission_phase_gating() {
    let mut engine = engine_for(build_scenario(ScenarioId::Skirmish), 1);
    let snap = engine.tick();
    assert_eq!(snap.phase, GamePhase::Setup);
    assert!(snap.units.is_empty());
    assert_eq!(snap.cover_points.len(), 4);

    engine.queue_command(UnitCommand::StartMission);
    let snap = engine.tick();
    assert_eq!(snap.phase, GamePhase::Active);
    assert_eq!(snap.units.len(), 4);

    // A second start does not spawn another squad.
    engine.queue_command(UnitCommand::StartMission);
    let snap = engine.tick();
    assert_eq!(snap.units.len(), 4);
}

#[test]
fn test_pause_stops_simulation() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    run(&mut engine, 10);
    let before = engine.time().tick;

    engine.queue_command(UnitCommand::Pause);
    let paused = run(&mut engine, 20);
    assert_eq!(paused.phase, GamePhase::Paused);
    assert_eq!(engine.time().tick, before);

    engine.queue_command(UnitCommand::Resume);
    run(&mut engine, 5);
    assert_eq!(engine.time().tick, before + 5);
}

#[test]
fn test_tick_timing_30_ticks_one_second() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    let snap = run(&mut engine, 30);
    assert_eq!(snap.time.tick, 30);
    assert!((snap.time.elapsed_secs - 1.0).abs() < 1e-9);
}

// ---- Cover behavior ----

#[test]
fn test_units_under_threat_end_in_cover() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    let snap = run(&mut engine, 400);

    assert_eq!(snap.summary.units_in_cover, 4);
    assert_eq!(snap.summary.units_seeking, 0);
    assert_consistent(&snap);
    for unit in &snap.units {
        let point = snap
            .cover_points
            .iter()
            .find(|p| Some(p.id) == unit.cover)
            .unwrap();
        assert!(point.occupants.contains(&unit.id));
        assert!(unit.position.range_to(&point.position) <= ARRIVAL_TOLERANCE);
    }
}

#[test]
fn test_first_tick_emits_reservations() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    let snap = engine.tick();
    let reserved: HashSet<UnitId> = snap
        .events
        .iter()
        .filter(|e| matches!(e, CoverEvent::Reserved { .. }))
        .filter_map(|e| e.unit())
        .collect();
    assert_eq!(reserved.len(), 4);
    assert_eq!(snap.summary.units_seeking, 4);

    // Events are per tick.
    let next = engine.tick();
    assert!(!next.events.iter().any(|e| matches!(e, CoverEvent::Reserved { .. })));
}

#[test]
fn test_contested_points_go_to_highest_priority() {
    let mut engine = started(build_scenario(ScenarioId::Contested));
    let snap = run(&mut engine, 400);

    let mut by_priority = snap.units.clone();
    by_priority.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    let expected: HashSet<UnitId> = by_priority.iter().take(3).map(|u| u.id).collect();
    let in_cover: HashSet<UnitId> = snap
        .units
        .iter()
        .filter(|u| u.state == UnitCoverState::InCover)
        .map(|u| u.id)
        .collect();

    assert_eq!(in_cover, expected);
    assert_eq!(snap.summary.units_in_cover, 3);
    for loser in snap.units.iter().filter(|u| !expected.contains(&u.id)) {
        assert_eq!(loser.state, UnitCoverState::SeekingCover);
        assert_eq!(loser.cover, None);
    }
    assert_consistent(&snap);
}

#[test]
fn test_destroying_cover_sends_units_back_to_seeking() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    let settled = run(&mut engine, 400);

    let target = settled
        .cover_points
        .iter()
        .max_by_key(|p| (p.occupants.len(), std::cmp::Reverse(p.id)))
        .unwrap();
    let displaced: Vec<UnitId> = target.occupants.clone();
    assert!(!displaced.is_empty());

    engine.queue_command(UnitCommand::DestroyCover { point: target.id });
    let snap = engine.tick();

    assert!(snap.events.contains(&CoverEvent::Disabled { point: target.id }));
    for unit in &displaced {
        assert!(snap.events.contains(&CoverEvent::Vacated { point: target.id, unit: *unit }));
        let view = snap.units.iter().find(|u| u.id == *unit).unwrap();
        assert_eq!(view.state, UnitCoverState::SeekingCover);
        assert_ne!(view.cover, Some(target.id));
    }
    let destroyed = snap.cover_points.iter().find(|p| p.id == target.id).unwrap();
    assert_eq!(destroyed.state, CoverState::Disabled);
    assert!(destroyed.occupants.is_empty() && destroyed.reservations.is_empty());
    assert_eq!(snap.summary.points_disabled, 1);
    assert!(snap.alerts.iter().any(|a| a.level == AlertLevel::Warning));

    // Remaining capacity still covers the squad.
    let snap = run(&mut engine, 400);
    assert_eq!(snap.summary.units_in_cover, 4);
    assert_consistent(&snap);
}

#[test]
fn test_restored_cover_is_used_again() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    engine.queue_command(UnitCommand::DestroyCover { point: CoverPointId(4) });
    run(&mut engine, 400);

    engine.queue_command(UnitCommand::RestoreCover { point: CoverPointId(4) });
    let snap = engine.tick();
    let restored = snap.cover_points.iter().find(|p| p.id == CoverPointId(4)).unwrap();
    assert_eq!(restored.state, CoverState::Available);
    assert!(snap.events.contains(&CoverEvent::Enabled { point: CoverPointId(4) }));
    assert_eq!(snap.summary.points_disabled, 0);
}

#[test]
fn test_killed_unit_frees_its_slot() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    let settled = run(&mut engine, 400);
    let victim = settled.units[0].clone();
    let point = victim.cover.unwrap();

    engine.queue_command(UnitCommand::KillUnit { unit: victim.id });
    let snap = engine.tick();

    assert!(snap.units.iter().all(|u| u.id != victim.id));
    let view = snap.cover_points.iter().find(|p| p.id == point).unwrap();
    assert!(!view.occupants.contains(&victim.id));
    assert!(snap.events.contains(&CoverEvent::Vacated { point, unit: victim.id }));
    assert_eq!(snap.summary.units_lost, 1);
    assert_eq!(snap.summary.units_total, 3);
    assert!(snap.alerts.iter().any(|a| a.level == AlertLevel::Critical));
    assert_eq!(engine.coordinator().claim_of(victim.id), None);
}

#[test]
fn test_order_seek_and_abandon_without_threat() {
    let mut engine = started(quiet_skirmish());
    let snap = run(&mut engine, 10);
    assert!(snap.units.iter().all(|u| u.state == UnitCoverState::Idle));

    let unit = UnitId(2);
    engine.queue_command(UnitCommand::OrderSeekCover { unit });
    let snap = run(&mut engine, 300);
    for view in &snap.units {
        let expected = if view.id == unit {
            UnitCoverState::InCover
        } else {
            UnitCoverState::Idle
        };
        assert_eq!(view.state, expected, "{}", view.name);
    }

    engine.queue_command(UnitCommand::OrderAbandonCover { unit });
    let snap = engine.tick();
    let view = snap.units.iter().find(|u| u.id == unit).unwrap();
    assert_eq!(view.state, UnitCoverState::Idle);
    assert_eq!(view.cover, None);
    assert!(engine.registry().points_holding(unit).is_empty());

    let snap = run(&mut engine, 60);
    let view = snap.units.iter().find(|u| u.id == unit).unwrap();
    assert_eq!(view.state, UnitCoverState::Idle);
}

#[test]
fn test_threat_cleared_units_stay_in_cover() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    run(&mut engine, 400);
    engine.queue_command(UnitCommand::ClearThreat);
    let snap = run(&mut engine, 60);
    assert_eq!(snap.threat, None);
    assert_eq!(snap.summary.units_in_cover, 4);
}

// ---- Damage ----

#[test]
fn test_apply_cover_damage() {
    assert_eq!(apply_cover_damage(100.0, 0.5), 50.0);
    assert_eq!(apply_cover_damage(100.0, 0.0), 100.0);
    assert_eq!(apply_cover_damage(-10.0, 0.5), 0.0);
    assert_eq!(apply_cover_damage(40.0, 1.5), 0.0);
    assert_eq!(apply_cover_damage(40.0, f64::NAN), 40.0);
}

#[test]
fn test_cover_reduces_damage() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    let settled = run(&mut engine, 400);
    let unit = &settled.units[0];
    let point = settled
        .cover_points
        .iter()
        .find(|p| Some(p.id) == unit.cover)
        .unwrap();
    assert!(point.effectiveness > 0.0);

    engine.queue_command(UnitCommand::DamageUnit { unit: unit.id, amount: 40.0 });
    let snap = engine.tick();
    let after = snap.units.iter().find(|u| u.id == unit.id).unwrap();
    let expected = unit.health - 40.0 * (1.0 - point.effectiveness);
    assert!((after.health - expected).abs() < 1e-9);
    // Wounds raise priority.
    assert!(after.priority > unit.priority);
}

#[test]
fn test_damage_in_the_open_is_unreduced() {
    let mut engine = started(quiet_skirmish());
    run(&mut engine, 5);
    engine.queue_command(UnitCommand::DamageUnit { unit: UnitId(1), amount: 40.0 });
    let snap = engine.tick();
    let view = snap.units.iter().find(|u| u.id == UnitId(1)).unwrap();
    assert!((view.health - 60.0).abs() < 1e-9);
}

#[test]
fn test_lethal_damage_removes_unit() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    run(&mut engine, 400);
    engine.queue_command(UnitCommand::DamageUnit { unit: UnitId(3), amount: 10_000.0 });
    let snap = engine.tick();
    assert!(snap.units.iter().all(|u| u.id != UnitId(3)));
    assert!(engine.registry().points_holding(UnitId(3)).is_empty());
    assert_consistent(&snap);
}

// ---- Diagnostics ----

#[test]
fn test_dump_lists_every_point_and_valid_units() {
    let mut engine = started(build_scenario(ScenarioId::Skirmish));
    run(&mut engine, 400);
    let dump = engine.dump();
    for id in 1..=4 {
        assert!(dump.contains(&format!("Cover Point: CoverPoint_{id}\n")));
    }
    assert_eq!(dump.matches("(Valid: YES)").count(), 4);
    assert!(!dump.contains("(Valid: NO)"));
    assert!(dump.contains("Sgt. Hale"));
}

// ---- Scenarios ----

#[test]
fn test_builtin_scenarios_start() {
    for id in [ScenarioId::Skirmish, ScenarioId::Contested, ScenarioId::Siege] {
        let scenario = build_scenario(id);
        let units = scenario.unit_count();
        let mut engine = started(scenario);
        let snap = run(&mut engine, 300);
        assert_eq!(snap.units.len(), units, "{id:?}");
        assert!(snap.summary.units_in_cover > 0, "{id:?}");
        assert_consistent(&snap);
    }
}

#[test]
fn test_parse_minimal_scenario_uses_defaults() {
    let json = r#"{
        "cover_points": [{ "id": 1, "position": { "x": 3.0, "y": 4.0 } }],
        "squads": [{ "squad": 1, "origin": {}, "members": [{ "name": "Able" }] }]
    }"#;
    let scenario = parse_scenario(json).unwrap();
    assert_eq!(scenario.name, "Custom");
    assert_eq!(scenario.threat, None);
    let point = &scenario.cover_points[0];
    assert_eq!(point.max_occupants, 1);
    assert_eq!(point.quality, CoverQuality::None);
    assert_eq!(point.position, Position::new(3.0, 4.0, 0.0));
    let member = &scenario.squads[0].members[0];
    assert_eq!(member.role, UnitRole::Rifleman);
    assert_eq!(member.health, 100.0);
}

#[test]
fn test_scenario_roundtrips_through_json() {
    let original = build_scenario(ScenarioId::Siege);
    let json = serde_json::to_string(&original).unwrap();
    let parsed = parse_scenario(&json).unwrap();
    assert_eq!(parsed.name, original.name);
    assert_eq!(parsed.cover_points.len(), original.cover_points.len());
    assert_eq!(parsed.unit_count(), original.unit_count());
}

#[test]
fn test_invalid_cover_layout_rejected() {
    let mut scenario = build_scenario(ScenarioId::Skirmish);
    scenario.cover_points[0].max_occupants = 0;
    let err = SimulationEngine::new(SimConfig { seed: 1, scenario }).err().unwrap();
    assert!(matches!(err, ScenarioError::Cover(CoverError::InvalidConfiguration(_))));

    let mut scenario = build_scenario(ScenarioId::Skirmish);
    scenario.cover_points[1].id = CoverPointId(1);
    let err = SimulationEngine::new(SimConfig { seed: 1, scenario }).err().unwrap();
    assert!(matches!(err, ScenarioError::Cover(CoverError::DuplicateCoverPoint(_))));
}

#[test]
fn test_invalid_scenario_rejected() {
    let json = r#"{ "squads": [{ "squad": 1, "origin": {}, "members": [
        { "name": "Able" }, { "name": "Able" } ] }] }"#;
    assert!(matches!(parse_scenario(json), Err(ScenarioError::Invalid(_))));
    assert!(matches!(parse_scenario("{ not json"), Err(ScenarioError::Json(_))));
}

#[test]
fn test_resolve_builtin_and_missing_file() {
    assert_eq!(resolve_scenario("Contested").unwrap().name, "Crossroads");
    let err = load_scenario(std::path::Path::new("/nonexistent/holdfast.json")).unwrap_err();
    assert!(matches!(err, ScenarioError::Io { .. }));
    assert!(matches!(resolve_scenario("/nonexistent/holdfast.json"), Err(ScenarioError::Io { .. })));
}
