//! Systems - logic that operates on components and the shared game state

mod behavior;
mod clues;
mod combat;
mod detection;
mod interrogation;
mod suspicion;
mod targeting;
mod timer;

pub use behavior::*;
pub use clues::*;
pub use combat::*;
pub use detection::*;
pub use interrogation::*;
pub use suspicion::*;
pub use targeting::*;
pub use timer::*;
