//! Session-wide game state, shared by reference with every system.

use serde::{Deserialize, Serialize};

use crate::components::{Clue, RoomId};

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Global suspicion reached the ceiling
    Apprehended,
    TimeExpired,
    KilledInnocent,
    TargetEliminated,
}

impl EndReason {
    pub fn message(&self) -> &'static str {
        match self {
            EndReason::Apprehended => "You were caught! The guards have apprehended you.",
            EndReason::TimeExpired => "Time ran out! The party has ended.",
            EndReason::KilledInnocent => "You killed an innocent guest! Mission failed.",
            EndReason::TargetEliminated => {
                "Target eliminated! You have completed your mission."
            }
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, EndReason::TargetEliminated)
    }
}

/// Discrete notifications for the scene orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ClueDiscovered(Clue),
    TargetIdentified,
    ClockChimed {
        time_remaining: f32,
    },
    GuestAlarmed {
        guest_id: String,
    },
    CorpseDiscovered {
        discoverer_id: String,
    },
    GuestEliminated {
        guest_id: String,
        silent: bool,
        witnesses: usize,
    },
    RoomChanged {
        from: RoomId,
        to: RoomId,
    },
    GameOver {
        won: bool,
        reason: EndReason,
        time_remaining: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub current_room: RoomId,
    /// Set once by target selection
    pub target_id: Option<String>,
    /// At most one clue per category
    pub discovered_clues: Vec<Clue>,
    /// Global suspicion, always within [0, SUSPICION_MAX]
    pub suspicion_level: f32,
    /// Seconds, never negative
    pub time_remaining: f32,
    pub is_game_over: bool,
    pub has_won: bool,
    pub has_identified_target: bool,
    pub end_reason: Option<EndReason>,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(time_remaining: f32) -> Self {
        Self {
            current_room: RoomId::Ballroom,
            target_id: None,
            discovered_clues: Vec::new(),
            suspicion_level: 0.0,
            time_remaining,
            is_game_over: false,
            has_won: false,
            has_identified_target: false,
            end_reason: None,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Latch the end of the session. Returns false if it had already ended.
    pub fn finish(&mut self, reason: EndReason) -> bool {
        if self.is_game_over {
            log::debug!("Ignoring game over ({reason:?}), session already ended");
            return false;
        }
        self.is_game_over = true;
        self.has_won = reason.is_win();
        self.end_reason = Some(reason);
        log::info!("Game over: {}", reason.message());
        self.emit(GameEvent::GameOver {
            won: self.has_won,
            reason,
            time_remaining: self.time_remaining,
        });
        true
    }
}
