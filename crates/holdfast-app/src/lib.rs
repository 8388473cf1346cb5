//! HOLDFAST headless runner.
//!
//! This crate wires the simulation crates together behind a command-line
//! front end: a game loop thread driving the engine, scripted commands, and
//! console reporting.

pub mod game_loop;
pub mod logging;
pub mod report;
pub mod script;
pub mod state;

pub use holdfast_core as core;
