//! Masqacre Core - Masquerade Stealth Simulation Engine
//!
//! A rendering-free simulation of a masked party: the player must work out
//! which guest is the hidden target, eliminate them, and get away before the
//! clock runs out or the guests raise too much suspicion.
//!
//! # Architecture
//!
//! Guests live in an Entity Component System (ECS) world via `hecs`:
//! - **Entities**: Guests and the corpses they leave behind
//! - **Components**: Pure data (GuestProfile, Position, Behavior, LocalSuspicion, ...)
//! - **Systems**: Free functions over the world and the shared [`state::GameState`]
//!
//! The player is a plain struct owned by the engine. Only guests in the
//! player's room are simulated.
//!
//! # Example
//!
//! ```rust
//! use masqacre_core::prelude::*;
//!
//! let mut engine = MasqueradeEngine::with_default_roster(GameConfig::default(), 42).unwrap();
//! engine.steer(PlayerInput::sneak(1, 0));
//!
//! for _ in 0..60 {
//!     engine.update(1000.0 / 60.0);
//! }
//! for event in engine.drain_events() {
//!     println!("{event:?}");
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod state;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::GameConfig;
    pub use crate::engine::MasqueradeEngine;
    pub use crate::error::EngineError;
    pub use crate::state::{EndReason, GameEvent, GameState};
    pub use crate::systems::{KillOutcome, KillReport, TargetDossier, Topic};
}
