//! Simulation engine: the host of the cover system.
//!
//! `SimulationEngine` owns the hecs ECS world of units, the cover registry
//! and coordinator, processes unit commands, runs all systems, and produces
//! `SimSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use holdfast_core::commands::UnitCommand;
use holdfast_core::components::{CoverLink, Dead, Unit};
use holdfast_core::constants::SEEK_RETRY_TICKS;
use holdfast_core::enums::{AlertLevel, GamePhase, UnitCoverState};
use holdfast_core::events::Alert;
use holdfast_core::state::SimSnapshot;
use holdfast_core::types::{Position, SimTime, UnitId};
use holdfast_cover::{dump_registry, CoverAssignmentCoordinator, CoverRegistry, EventRecorder};

use crate::scenario::{build_scenario, ScenarioConfig, ScenarioError};
use crate::systems;
use crate::systems::snapshot::SnapshotInputs;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub scenario: ScenarioConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scenario: build_scenario(Default::default()),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    rng: ChaCha8Rng,
    scenario: ScenarioConfig,
    coordinator: CoverAssignmentCoordinator,
    recorder: EventRecorder,
    threat: Option<Position>,
    command_queue: VecDeque<UnitCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    alerts: Vec<Alert>,
    units_lost: u32,
}

impl SimulationEngine {
    /// Create a new engine. Cover points are registered immediately; units
    /// deploy on `StartMission`.
    pub fn new(config: SimConfig) -> Result<Self, ScenarioError> {
        config.scenario.validate()?;

        let registry = Arc::new(CoverRegistry::with_weights(config.scenario.ranking.into()));
        let recorder = registry.events().recorder();
        let count = world_setup::spawn_cover_points(&registry, &config.scenario)?;
        info!(scenario = %config.scenario.name, cover_points = count, seed = config.seed, "engine ready");

        Ok(Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            scenario: config.scenario,
            coordinator: CoverAssignmentCoordinator::new(registry),
            recorder,
            threat: None,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            alerts: Vec::new(),
            units_lost: 0,
        })
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: UnitCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = UnitCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> SimSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        systems::snapshot::build_snapshot(
            &self.world,
            self.coordinator.registry(),
            SnapshotInputs {
                time: self.time,
                phase: self.phase,
                threat: self.threat,
                alerts: std::mem::take(&mut self.alerts),
                events: self.recorder.drain(),
                units_lost: self.units_lost,
            },
        )
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn threat(&self) -> Option<Position> {
        self.threat
    }

    pub fn scenario(&self) -> &ScenarioConfig {
        &self.scenario
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn registry(&self) -> &Arc<CoverRegistry> {
        self.coordinator.registry()
    }

    pub fn coordinator(&self) -> &CoverAssignmentCoordinator {
        &self.coordinator
    }

    /// Names of every live unit, for the diagnostic dump.
    pub fn unit_directory(&self) -> HashMap<UnitId, String> {
        self.world
            .query::<&Unit>()
            .iter()
            .map(|(_, unit)| (unit.id, unit.name.clone()))
            .collect()
    }

    /// Diagnostic dump of every cover point.
    pub fn dump(&self) -> String {
        dump_registry(self.registry(), &self.unit_directory())
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn alert(&mut self, level: AlertLevel, message: String) {
        self.alerts.push(Alert {
            level,
            message,
            tick: self.time.tick,
        });
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: UnitCommand) {
        let tick = self.time.tick;
        match command {
            UnitCommand::StartMission => {
                if self.phase == GamePhase::Setup {
                    let count =
                        world_setup::spawn_units(&mut self.world, &mut self.rng, &self.scenario);
                    self.threat = self.scenario.threat;
                    self.phase = GamePhase::Active;
                    self.time = SimTime::default();
                    info!(units = count, "mission started");
                }
            }
            UnitCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            UnitCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            UnitCommand::SetThreat { position } => {
                self.threat = Some(position);
                self.alert(AlertLevel::Warning, "contact, take cover".into());
            }
            UnitCommand::ClearThreat => {
                self.threat = None;
                self.alert(AlertLevel::Info, "threat cleared".into());
            }
            UnitCommand::OrderSeekCover { unit } => {
                let Some(entity) = world_setup::find_unit(&self.world, unit) else {
                    warn!(%unit, "order for unknown unit");
                    return;
                };
                if let Ok(mut link) = self.world.get::<&mut CoverLink>(entity) {
                    link.ordered = true;
                    link.retry_at_tick = 0;
                }
            }
            UnitCommand::OrderAbandonCover { unit } => {
                let outcome = self.coordinator.abandon(unit);
                let Some(entity) = world_setup::find_unit(&self.world, unit) else {
                    return;
                };
                if let Ok(mut link) = self.world.get::<&mut CoverLink>(entity) {
                    *link = CoverLink {
                        state: UnitCoverState::Idle,
                        cover: None,
                        state_start_tick: tick,
                        retry_at_tick: tick + SEEK_RETRY_TICKS,
                        ordered: false,
                    };
                }
                info!(%unit, ?outcome, "ordered out of cover");
            }
            UnitCommand::DamageUnit { unit, amount } => {
                let Some(entity) = world_setup::find_unit(&self.world, unit) else {
                    return;
                };
                let taken = systems::damage::damage_unit(
                    &mut self.world,
                    self.coordinator.registry(),
                    self.threat,
                    entity,
                    amount,
                );
                if let Some(taken) = taken {
                    info!(%unit, raw = amount, taken, "unit hit");
                }
            }
            UnitCommand::KillUnit { unit } => {
                if let Some(entity) = world_setup::find_unit(&self.world, unit) {
                    let _ = self.world.insert_one(entity, Dead);
                }
            }
            UnitCommand::DestroyCover { point } => match self.coordinator.destroy_cover(point) {
                Ok(evicted) => {
                    self.alert(
                        AlertLevel::Warning,
                        format!("{point} destroyed, {} units displaced", evicted.len()),
                    );
                }
                Err(err) => warn!(%point, %err, "cannot destroy cover"),
            },
            UnitCommand::RestoreCover { point } => {
                if let Err(err) = self.coordinator.restore_cover(point) {
                    warn!(%point, %err, "cannot restore cover");
                }
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let tick = self.time.tick;
        // 1. Squad AI (FSM, raises cover requests)
        let requests = systems::squad_ai::run(&mut self.world, &self.coordinator, self.threat, tick);
        // 2. Cover seeking (priority batch)
        systems::cover_seeking::run(
            &mut self.world,
            &self.coordinator,
            requests,
            tick,
            &mut self.alerts,
        );
        // 3. Movement + arrival
        systems::movement::run(&mut self.world, &self.coordinator, tick);
        // 4. Cleanup (dead units)
        let removed = systems::cleanup::run(&mut self.world, &self.coordinator, &mut self.despawn_buffer);
        for unit in removed {
            self.units_lost += 1;
            self.alert(AlertLevel::Critical, format!("{unit} lost"));
        }
    }
}
