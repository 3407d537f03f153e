//! Error types for engine construction and entity lookups.
//!
//! Gameplay misfires never surface here; they are logged no-ops.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid game config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to parse guest roster: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("guest roster is empty")]
    Empty,
    #[error("duplicate guest id `{0}`")]
    DuplicateId(String),
    #[error("no guest in the roster can be the target")]
    NoEligibleTarget,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("entity {0:?} is not a guest")]
    UnknownGuest(hecs::Entity),
}
