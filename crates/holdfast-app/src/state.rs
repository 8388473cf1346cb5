//! State shared between the front end and the game loop thread.

use std::sync::Arc;

use parking_lot::Mutex;

use holdfast_core::commands::UnitCommand;
use holdfast_core::state::SimSnapshot;

/// Commands sent from the front end to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A unit command to forward to the simulation engine.
    Unit(UnitCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// How the game loop runs.
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    /// Ticks to run before the loop ends on its own.
    pub ticks: u64,
    /// Pace ticks to wall-clock time instead of running flat out.
    pub realtime: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            ticks: 300,
            realtime: false,
        }
    }
}

/// Latest snapshot, updated by the game loop after each tick.
pub type SharedSnapshot = Arc<Mutex<Option<SimSnapshot>>>;
