//! Party clock - countdown, chimes and the time-expired ending

use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;
use crate::state::{EndReason, GameEvent, GameState};

/// Countdown over `GameState::time_remaining`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    total_seconds: f32,
    chime_interval: f32,
    last_chime: f32,
    running: bool,
}

impl Countdown {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            total_seconds: config.game_time_seconds,
            chime_interval: config.chime_interval_seconds,
            last_chime: config.game_time_seconds,
            running: false,
        }
    }

    /// Reset the clock to full and start counting down
    pub fn start(&mut self, state: &mut GameState) {
        state.time_remaining = self.total_seconds;
        self.last_chime = self.total_seconds;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn update(&mut self, state: &mut GameState, delta_ms: f32) {
        if !self.running {
            return;
        }

        state.time_remaining -= delta_ms / 1000.0;

        let current_bucket = (state.time_remaining.floor() / self.chime_interval).floor();
        let last_bucket = (self.last_chime.floor() / self.chime_interval).floor();
        if last_bucket > current_bucket {
            self.last_chime = state.time_remaining;
            log::info!("The clock chimes, {} remaining", format_clock(state.time_remaining));
            state.emit(GameEvent::ClockChimed {
                time_remaining: state.time_remaining,
            });
        }

        if state.time_remaining <= 0.0 {
            state.time_remaining = 0.0;
            self.running = false;
            state.finish(EndReason::TimeExpired);
        }
    }

    /// Fraction of the party left, 1.0 at start
    pub fn progress(&self, state: &GameState) -> f32 {
        state.time_remaining / self.total_seconds
    }
}

/// `m:ss` of the whole seconds remaining
pub fn format_clock(seconds: f32) -> String {
    let whole = seconds.max(0.0).floor() as u32;
    format!("{}:{:02}", whole / 60, whole % 60)
}
