//! Squad AI for HOLDFAST.
//!
//! Role profiles, cover priority scoring, and the per-unit cover state
//! machine. Pure functions over plain data; the simulation crate feeds them
//! from the ECS world and carries out the resulting actions.

pub mod fsm;
pub mod profiles;

pub use holdfast_core as core;
