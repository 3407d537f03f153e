//! Behavior system - advances each guest's state machine and picks its velocity

use hecs::World;
use rand::Rng;

use crate::components::*;
use crate::config::GameConfig;
use crate::generation::roll_idle_time;

/// Advance the state machine of every living guest in `room`.
///
/// Only movement intent is decided here; positions are integrated by
/// [`guest_movement_system`].
pub fn behavior_system(
    world: &mut World,
    room: RoomId,
    walkable: &Rect,
    player_position: Vec2,
    config: &GameConfig,
    rng: &mut impl Rng,
    delta_ms: f32,
) {
    let timings = &config.behavior;
    let speeds = &config.movement;

    for (_, (pos, velocity, behavior, suspicion, _)) in world.query_mut::<(
        &Position,
        &mut Velocity,
        &mut Behavior,
        &LocalSuspicion,
        &Alive,
    )>() {
        if pos.room != room {
            continue;
        }

        behavior.state_timer += delta_ms;

        match behavior.state {
            BehaviorState::Idle => {
                velocity.0 = Vec2::ZERO;
                behavior.idle_time += delta_ms;

                if behavior.idle_time > behavior.max_idle_time {
                    behavior.idle_time = 0.0;
                    behavior.max_idle_time = roll_idle_time(timings, rng);

                    if rng.gen::<f32>() < timings.wander_chance {
                        behavior.start_wandering(walkable.sample(rng));
                    } else {
                        behavior.start_socializing();
                    }
                }
            }
            BehaviorState::Wandering => match behavior.wander_target {
                Some(target) if pos.local.distance(&target) >= speeds.arrive_distance => {
                    velocity.0 = pos.local.toward(&target, speeds.npc_wander_speed);
                }
                // Arrived, or nowhere to go
                _ => {
                    velocity.0 = Vec2::ZERO;
                    behavior.reset();
                }
            },
            BehaviorState::Socializing => {
                velocity.0 = Vec2::ZERO;
                if behavior.state_timer > timings.socialize_ms {
                    behavior.reset();
                }
            }
            BehaviorState::Curious => {
                velocity.0 = Vec2::ZERO;
                if behavior.state_timer > timings.curious_ms {
                    behavior.reset();
                }
            }
            BehaviorState::Suspicious => {
                velocity.0 = Vec2::ZERO;
                if behavior.state_timer > timings.suspicious_ms {
                    behavior.state_timer = 0.0;
                    if suspicion.0 < config.perception.suspicious_threshold {
                        behavior.reset();
                    }
                }
            }
            BehaviorState::Alarmed => {
                velocity.0 = pos.local.toward(&player_position, speeds.npc_chase_speed);
            }
        }
    }
}

/// Integrate guest velocities in `room`, keeping guests inside `bounds`.
///
/// A wandering guest that would overshoot its target lands on it.
pub fn guest_movement_system(world: &mut World, room: RoomId, bounds: &Rect, delta_ms: f32) {
    let dt = delta_ms / 1000.0;

    for (_, (pos, velocity, facing, behavior, _)) in world.query_mut::<(
        &mut Position,
        &Velocity,
        &mut Facing,
        &Behavior,
        &Alive,
    )>() {
        if pos.room != room || velocity.0.is_zero() {
            continue;
        }

        let step = velocity.0 * dt;
        let landing = match (behavior.state, behavior.wander_target) {
            (BehaviorState::Wandering, Some(target))
                if step.length() >= pos.local.distance(&target) =>
            {
                target
            }
            _ => pos.local + step,
        };
        pos.local = bounds.clamp(landing);

        if let Some(new_facing) = Facing::from_velocity(velocity.0) {
            *facing = new_facing;
        }
    }
}
