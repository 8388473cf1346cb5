//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for read-only)
//! plus the cover coordinator. They do not own state. Unit state lives in
//! components, slot state lives in the cover points.

pub mod cleanup;
pub mod cover_seeking;
pub mod damage;
pub mod movement;
pub mod snapshot;
pub mod squad_ai;
