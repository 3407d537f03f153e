//! Global suspicion meter

use hecs::World;

use crate::components::{Alive, Behavior, Position};
use crate::config::{SuspicionConfig, SUSPICION_MAX};
use crate::state::{EndReason, GameState};

pub fn add_suspicion(state: &mut GameState, amount: f32) {
    state.suspicion_level = (state.suspicion_level + amount).clamp(0.0, SUSPICION_MAX);
}

pub fn remove_suspicion(state: &mut GameState, amount: f32) {
    state.suspicion_level = (state.suspicion_level - amount).clamp(0.0, SUSPICION_MAX);
}

/// True if any living guest in the current room is alarmed
pub fn room_is_alarmed(world: &World, state: &GameState) -> bool {
    world
        .query::<(&Position, &Behavior, &Alive)>()
        .iter()
        .any(|(_, (pos, behavior, _))| pos.room == state.current_room && behavior.is_alarmed())
}

/// End the session if the meter sits at the ceiling. Returns true if it does.
pub fn check_ceiling(state: &mut GameState) -> bool {
    if state.suspicion_level >= SUSPICION_MAX {
        state.finish(EndReason::Apprehended);
        true
    } else {
        false
    }
}

/// Passive decay, then the ceiling check.
///
/// Decay is suppressed entirely while anyone in the room is alarmed. A meter
/// that reached the ceiling since the last tick never gets to decay.
pub fn suspicion_system(
    world: &World,
    state: &mut GameState,
    config: &SuspicionConfig,
    delta_ms: f32,
) {
    if check_ceiling(state) {
        return;
    }

    if state.suspicion_level > 0.0 && !room_is_alarmed(world, state) {
        remove_suspicion(state, config.decay_per_second * delta_ms / 1000.0);
    }

    check_ceiling(state);
}

pub fn is_high_alert(state: &GameState, config: &SuspicionConfig) -> bool {
    state.suspicion_level >= config.high_alert_level
}

/// Meter fill in percent
pub fn suspicion_percentage(state: &GameState) -> f32 {
    state.suspicion_level / SUSPICION_MAX * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{RoomId, Vec2};

    #[test]
    fn test_clamped_both_ways() {
        let mut state = GameState::new(300.0);
        add_suspicion(&mut state, 250.0);
        assert_eq!(state.suspicion_level, SUSPICION_MAX);
        remove_suspicion(&mut state, 400.0);
        assert_eq!(state.suspicion_level, 0.0);
        add_suspicion(&mut state, -10.0);
        assert_eq!(state.suspicion_level, 0.0);
    }

    #[test]
    fn test_below_ceiling_keeps_playing() {
        let mut state = GameState::new(300.0);
        add_suspicion(&mut state, 99.9);
        assert!(!check_ceiling(&mut state));
        assert!(!state.is_game_over);
    }

    #[test]
    fn test_decays_when_calm() {
        let world = World::new();
        let mut state = GameState::new(300.0);
        add_suspicion(&mut state, 10.0);
        suspicion_system(&world, &mut state, &SuspicionConfig::default(), 2000.0);
        assert!((state.suspicion_level - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_alarmed_guest_blocks_decay() {
        let mut world = World::new();
        let mut behavior = Behavior::new(3000.0);
        behavior.become_alarmed();
        world.spawn((Position::at(Vec2::ZERO, RoomId::Ballroom), behavior, Alive));

        let mut state = GameState::new(300.0);
        add_suspicion(&mut state, 10.0);
        suspicion_system(&world, &mut state, &SuspicionConfig::default(), 2000.0);
        assert_eq!(state.suspicion_level, 10.0);

        // An alarmed guest elsewhere does not count
        state.current_room = RoomId::Garden;
        suspicion_system(&world, &mut state, &SuspicionConfig::default(), 2000.0);
        assert!(state.suspicion_level < 10.0);
    }

    #[test]
    fn test_ceiling_ends_game() {
        let world = World::new();
        let mut state = GameState::new(300.0);
        add_suspicion(&mut state, 100.0);
        assert!(is_high_alert(&state, &SuspicionConfig::default()));
        assert_eq!(suspicion_percentage(&state), 100.0);

        suspicion_system(&world, &mut state, &SuspicionConfig::default(), 16.0);
        assert!(state.is_game_over);
        assert_eq!(state.suspicion_level, 100.0);
        assert_eq!(state.end_reason, Some(EndReason::Apprehended));
    }
}
