//! Core types and definitions for the HOLDFAST cover system.
//!
//! This crate defines the vocabulary shared across all other crates:
//! identifiers, components, commands, state snapshots, events, errors
//! and constants. It has no dependency on any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
