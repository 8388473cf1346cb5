//! Simulation host for HOLDFAST.
//!
//! Owns the hecs ECS world of units, wires them to the cover registry and
//! coordinator, runs systems at a fixed tick rate, and produces SimSnapshots
//! for the frontend.

pub mod engine;
pub mod scenario;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use holdfast_core as core;
pub use scenario::{ScenarioConfig, ScenarioError};

#[cfg(test)]
mod tests;
