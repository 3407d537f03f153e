//! Detection system - guests perceiving the player, corpses and noise
//!
//! Perception is a pure radius check; there is no line of sight.

use hecs::World;

use super::add_suspicion;
use crate::components::*;
use crate::config::PerceptionConfig;
use crate::state::{GameEvent, GameState};

/// Radius visibility test, inclusive at `vision_range`
pub fn can_perceive(observer: &Vec2, subject: &Vec2, vision_range: f32) -> bool {
    observer.distance(subject) <= vision_range
}

/// Accumulate local suspicion for every living guest in the current room
/// and escalate their behavior when thresholds are crossed.
///
/// Gains and decay are flat per tick, not scaled by the frame delta.
pub fn detection_system(
    world: &mut World,
    state: &mut GameState,
    player: &Player,
    config: &PerceptionConfig,
) {
    let loud = player.is_moving() && !player.is_sneaking;

    for (_, (profile, pos, behavior, suspicion, _)) in world.query_mut::<(
        &GuestProfile,
        &Position,
        &mut Behavior,
        &mut LocalSuspicion,
        &Alive,
    )>() {
        if pos.room != state.current_room {
            continue;
        }

        let distance = pos.local.distance(&player.position);
        if distance > config.vision_range {
            suspicion.0 = (suspicion.0 - config.local_decay).max(0.0);
            continue;
        }

        let mut gain = 0.0;
        if loud {
            gain += config.moving_gain;
        }
        if distance < config.close_range {
            gain += config.close_gain;
        }
        if gain <= 0.0 {
            continue;
        }

        suspicion.0 += gain;

        let level = suspicion.0;
        match behavior.state {
            _ if level > config.alarmed_threshold && !behavior.is_alarmed() => {
                behavior.become_alarmed();
                add_suspicion(state, config.alarmed_penalty);
                log::info!("{} is alarmed", profile.name);
                state.emit(GameEvent::GuestAlarmed {
                    guest_id: profile.id.clone(),
                });
            }
            BehaviorState::Idle | BehaviorState::Wandering | BehaviorState::Socializing
            | BehaviorState::Curious
                if level > config.suspicious_threshold =>
            {
                behavior.become_suspicious();
                add_suspicion(state, config.suspicious_penalty);
            }
            BehaviorState::Idle | BehaviorState::Wandering | BehaviorState::Socializing
                if level > config.curious_threshold =>
            {
                behavior.become_curious();
                add_suspicion(state, config.curious_penalty);
            }
            _ => {}
        }
    }
}

/// Guests near a corpse raise a room-wide alarm.
///
/// Every (guest, corpse) pair within range counts as one discovery, each
/// adding the full penalty.
pub fn corpse_discovery_system(world: &mut World, state: &mut GameState, config: &PerceptionConfig) {
    let room = state.current_room;

    let corpses: Vec<Vec2> = world
        .query::<(&Corpse, &Position)>()
        .iter()
        .filter(|(_, (_, pos))| pos.room == room)
        .map(|(_, (_, pos))| pos.local)
        .collect();
    if corpses.is_empty() {
        return;
    }

    let mut discoveries: Vec<(String, String)> = Vec::new();
    for (_, (profile, pos, _)) in world.query::<(&GuestProfile, &Position, &Alive)>().iter() {
        if pos.room != room {
            continue;
        }
        for corpse in &corpses {
            if pos.local.distance(corpse) < config.corpse_discovery_radius {
                discoveries.push((profile.id.clone(), profile.name.clone()));
            }
        }
    }

    for (discoverer_id, discoverer_name) in discoveries {
        log::info!("{discoverer_name} discovered a body!");
        alarm_room(world, state);
        add_suspicion(state, config.corpse_discovery_penalty);
        state.emit(GameEvent::CorpseDiscovered { discoverer_id });
    }
}

/// Force every living guest in the current room into `Alarmed`
pub fn alarm_room(world: &mut World, state: &mut GameState) {
    let room = state.current_room;
    for (_, (profile, pos, behavior, _)) in
        world.query_mut::<(&GuestProfile, &Position, &mut Behavior, &Alive)>()
    {
        if pos.room == room && behavior.become_alarmed() {
            state.emit(GameEvent::GuestAlarmed {
                guest_id: profile.id.clone(),
            });
        }
    }
}

/// Startle calm guests strictly within `radius` of `origin` into `Curious`.
///
/// Returns how many guests were startled.
pub fn propagate_noise(world: &mut World, room: RoomId, origin: Vec2, radius: f32) -> usize {
    let mut startled = 0;
    for (_, (pos, behavior, _)) in world.query_mut::<(&Position, &mut Behavior, &Alive)>() {
        if pos.room == room && behavior.state.is_calm() && pos.local.distance(&origin) < radius {
            behavior.become_curious();
            startled += 1;
        }
    }
    startled
}
