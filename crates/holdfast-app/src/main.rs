//! `holdfast` command-line front end.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use holdfast_app::game_loop::spawn_game_loop;
use holdfast_app::logging::init_logging;
use holdfast_app::report;
use holdfast_app::script::CommandScript;
use holdfast_app::state::LoopOptions;
use holdfast_core::commands::UnitCommand;
use holdfast_core::constants::TICK_RATE;
use holdfast_sim::scenario::resolve_scenario;
use holdfast_sim::{SimConfig, SimulationEngine};

/// Squad cover occupancy simulation.
#[derive(Parser, Debug)]
#[command(name = "holdfast", version, about, long_about = None)]
struct Cli {
    /// Built-in scenario (skirmish, contested, siege) or a scenario JSON file.
    #[arg(short, long, default_value = "skirmish")]
    scenario: String,

    /// Ticks to simulate (30 per simulated second).
    #[arg(short, long, default_value_t = 300)]
    ticks: u64,

    /// RNG seed. Same seed, same run.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Timed commands: a JSON array of `{ "tick": n, "command": {...} }`.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Pace the simulation to wall-clock time.
    #[arg(long)]
    realtime: bool,

    /// Print every cover event as it happens.
    #[arg(short, long)]
    events: bool,

    /// Print the final snapshot as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Print the cover point dump after the run.
    #[arg(long)]
    dump: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let scenario = resolve_scenario(&cli.scenario)
        .with_context(|| format!("failed to load scenario '{}'", cli.scenario))?;
    let script = match &cli.script {
        Some(path) => CommandScript::load(path)?,
        None => CommandScript::default(),
    };
    info!(scenario = %scenario.name, units = scenario.unit_count(), scripted = script.len(), "starting");

    let mut engine = SimulationEngine::new(SimConfig {
        seed: cli.seed,
        scenario,
    })
    .context("failed to set up simulation")?;
    engine.queue_command(UnitCommand::StartMission);

    let handle = spawn_game_loop(
        engine,
        script,
        LoopOptions {
            ticks: cli.ticks,
            realtime: cli.realtime,
        },
    )?;

    let mut last = None;
    for snapshot in handle.snapshots.iter() {
        if !cli.json {
            if cli.events {
                for event in &snapshot.events {
                    println!("{}", report::event_line(snapshot.time.tick, event));
                }
            }
            for alert in &snapshot.alerts {
                println!("[tick {:>5}] {:?}: {}", alert.tick, alert.level, alert.message);
            }
            if snapshot.time.tick % u64::from(TICK_RATE) == 0 {
                println!("{}", report::status_line(&snapshot));
            }
        }
        last = Some(snapshot);
    }
    let engine = handle.join()?;

    if let Some(snapshot) = &last {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(snapshot)?);
        } else {
            println!("{}", report::summary(snapshot));
        }
    }
    if cli.dump {
        print!("{}", engine.dump());
    }
    Ok(())
}
