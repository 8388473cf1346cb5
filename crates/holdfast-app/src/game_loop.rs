//! Game loop thread. Runs the simulation engine and streams snapshots.
//!
//! Commands arrive via an `mpsc` channel. Snapshots go out over a second
//! channel and are stored in shared state for polling. The engine is handed
//! back through the join handle when the loop ends.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use tracing::{debug, info};

use holdfast_core::commands::UnitCommand;
use holdfast_core::constants::TICK_RATE;
use holdfast_core::state::SimSnapshot;
use holdfast_sim::SimulationEngine;

use crate::script::CommandScript;
use crate::state::{GameLoopCommand, LoopOptions, SharedSnapshot};

/// Nominal duration of one tick at 1x speed.
pub const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Front-end side of a running game loop.
pub struct GameLoopHandle {
    commands: mpsc::Sender<GameLoopCommand>,
    /// One snapshot per tick. Closes when the loop ends.
    pub snapshots: mpsc::Receiver<SimSnapshot>,
    pub latest: SharedSnapshot,
    thread: JoinHandle<SimulationEngine>,
}

impl GameLoopHandle {
    /// Forward a command to the engine. It is applied at the next tick.
    pub fn send(&self, command: UnitCommand) -> anyhow::Result<()> {
        self.commands
            .send(GameLoopCommand::Unit(command))
            .map_err(|_| anyhow!("game loop has stopped"))
    }

    /// Ask the loop to stop after the current tick.
    pub fn shutdown(&self) {
        let _ = self.commands.send(GameLoopCommand::Shutdown);
    }

    /// Wait for the loop to end and take the engine back.
    pub fn join(self) -> anyhow::Result<SimulationEngine> {
        self.thread
            .join()
            .map_err(|_| anyhow!("game loop thread panicked"))
    }
}

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop(
    engine: SimulationEngine,
    script: CommandScript,
    options: LoopOptions,
) -> anyhow::Result<GameLoopHandle> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let (snap_tx, snap_rx) = mpsc::channel::<SimSnapshot>();
    let latest = SharedSnapshot::default();
    let shared = latest.clone();

    let thread = std::thread::Builder::new()
        .name("holdfast-game-loop".into())
        .spawn(move || run_game_loop(engine, script, options, cmd_rx, snap_tx, &shared))
        .context("failed to spawn game loop thread")?;

    Ok(GameLoopHandle {
        commands: cmd_tx,
        snapshots: snap_rx,
        latest,
        thread,
    })
}

/// The game loop. Runs for `options.ticks` ticks or until Shutdown.
fn run_game_loop(
    mut engine: SimulationEngine,
    mut script: CommandScript,
    options: LoopOptions,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    snap_tx: mpsc::Sender<SimSnapshot>,
    latest_snapshot: &SharedSnapshot,
) -> SimulationEngine {
    let mut next_tick_time = Instant::now();
    info!(ticks = options.ticks, realtime = options.realtime, "game loop started");

    for _ in 0..options.ticks {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Unit(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => {
                    info!(tick = engine.time().tick, "game loop shut down");
                    return engine;
                }
                Err(mpsc::TryRecvError::Empty | mpsc::TryRecvError::Disconnected) => break,
            }
        }

        // 2. Scripted commands due this tick
        let due = script.due(engine.time().tick);
        if !due.is_empty() {
            debug!(tick = engine.time().tick, count = due.len(), "scripted commands");
            engine.queue_commands(due);
        }

        // 3. Advance one tick (engine handles pause semantics internally)
        let snapshot = engine.tick();

        // 4. Store latest snapshot for polling, then stream it
        *latest_snapshot.lock() = Some(snapshot.clone());
        let _ = snap_tx.send(snapshot);

        // 5. Sleep until next tick
        if options.realtime {
            next_tick_time += TICK_DURATION;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > TICK_DURATION * 2 {
                // Too far behind, reset to avoid catch-up spiral
                next_tick_time = now;
            }
        }
    }

    info!(tick = engine.time().tick, "game loop finished");
    engine
}
