//! Component definitions for the ECS simulation.
//!
//! Components are plain data attached to guest and corpse entities.
//! Tick logic lives in systems.

mod clues;
mod common;
mod guests;
mod player;

pub use clues::*;
pub use common::*;
pub use guests::*;
pub use player::*;
