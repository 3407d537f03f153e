//! Elimination - backstab test, witnesses and kill resolution

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use super::{add_suspicion, propagate_noise};
use crate::components::*;
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::state::{EndReason, GameEvent, GameState};

/// What happened to a kill attempt
#[derive(Debug, Clone, PartialEq)]
pub enum KillOutcome {
    /// Victim is dead, in another room, or the session is over
    Ignored,
    OutOfRange { distance: f32 },
    Executed(KillReport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillReport {
    pub guest_id: String,
    pub backstab: bool,
    /// No noise, no suspicion, no alert
    pub silent: bool,
    #[serde(skip)]
    pub witnesses: Vec<Entity>,
    pub was_target: bool,
    /// Where the body fell
    pub position: Vec2,
}

/// Whether `player` stands behind a guest at `guest` with the given heading.
///
/// A moving guest is judged by its dominant velocity axis, a still one by
/// its facing.
pub fn is_player_behind(player: &Vec2, guest: &Vec2, velocity: &Vec2, facing: Facing) -> bool {
    let dx = player.x - guest.x;
    let dy = player.y - guest.y;

    if velocity.is_zero() {
        return match facing {
            Facing::Up => dy > 0.0,
            Facing::Down => dy < 0.0,
            Facing::Left => dx > 0.0,
            Facing::Right => dx < 0.0,
        };
    }

    if velocity.x.abs() > velocity.y.abs() {
        if velocity.x > 0.0 {
            dx < 0.0
        } else {
            dx > 0.0
        }
    } else if velocity.y > 0.0 {
        dy < 0.0
    } else {
        dy > 0.0
    }
}

/// Living guests in `room`, other than `victim`, strictly within `radius` of `origin`
pub fn witnesses(world: &World, victim: Entity, room: RoomId, origin: &Vec2, radius: f32) -> Vec<Entity> {
    world
        .query::<(&Position, &Alive)>()
        .with::<&GuestProfile>()
        .iter()
        .filter(|(entity, (pos, _))| {
            *entity != victim && pos.room == room && pos.local.distance(origin) < radius
        })
        .map(|(entity, _)| entity)
        .collect()
}

/// Resolve a kill attempt on `victim`.
///
/// Out-of-range or otherwise impossible attempts change nothing. An executed
/// kill of an innocent ends the session at once; a target kill is reported
/// with `was_target` and the caller schedules the delayed win.
pub fn attempt_kill(
    world: &mut World,
    state: &mut GameState,
    player: &Player,
    victim: Entity,
    config: &GameConfig,
) -> Result<KillOutcome, EngineError> {
    let (guest_id, name, was_target, position, velocity, facing) = {
        let mut query = world
            .query_one::<(&GuestProfile, &Position, &Velocity, &Facing, Option<&Alive>)>(victim)
            .map_err(|_| EngineError::UnknownGuest(victim))?;
        let Some((profile, pos, velocity, facing, alive)) = query.get() else {
            return Err(EngineError::UnknownGuest(victim));
        };

        if state.is_game_over || alive.is_none() || pos.room != state.current_room {
            log::debug!("Kill attempt on {} ignored", profile.name);
            return Ok(KillOutcome::Ignored);
        }

        (
            profile.id.clone(),
            profile.name.clone(),
            profile.is_target,
            pos.local,
            velocity.0,
            *facing,
        )
    };

    let distance = player.position.distance(&position);
    if distance > config.interaction_range() {
        log::debug!("Too far away to attack {name} ({distance:.1})");
        return Ok(KillOutcome::OutOfRange { distance });
    }

    let backstab = is_player_behind(&player.position, &position, &velocity, facing);
    let seen_by = witnesses(
        world,
        victim,
        state.current_room,
        &position,
        config.combat.witness_radius,
    );
    let silent = backstab && seen_by.is_empty();

    // The guest falls where they stood
    world
        .remove_one::<Alive>(victim)
        .map_err(|_| EngineError::UnknownGuest(victim))?;
    if let Ok(mut v) = world.get::<&mut Velocity>(victim) {
        v.0 = Vec2::ZERO;
    }
    world.spawn((
        Corpse {
            guest_id: guest_id.clone(),
        },
        Position::at(position, state.current_room),
    ));
    state.emit(GameEvent::GuestEliminated {
        guest_id: guest_id.clone(),
        silent,
        witnesses: seen_by.len(),
    });

    if !silent {
        propagate_noise(world, state.current_room, position, config.combat.noise_radius);
        add_suspicion(state, config.combat.loud_kill_penalty);

        if !seen_by.is_empty() {
            for witness in &seen_by {
                let Ok(mut query) = world.query_one::<(&GuestProfile, &mut Behavior)>(*witness) else {
                    continue;
                };
                if let Some((profile, behavior)) = query.get() {
                    if behavior.become_alarmed() {
                        state.emit(GameEvent::GuestAlarmed {
                            guest_id: profile.id.clone(),
                        });
                    }
                }
            }
            add_suspicion(state, config.combat.witnessed_kill_penalty);
            log::info!("Kill witnessed by {} guest(s)!", seen_by.len());
        }
    }

    if was_target {
        log::info!("{name} eliminated, and they were the target");
    } else {
        state.finish(EndReason::KilledInnocent);
    }

    Ok(KillOutcome::Executed(KillReport {
        guest_id,
        backstab,
        silent,
        witnesses: seen_by,
        was_target,
        position,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_guest(world: &mut World, id: &str, x: f32, y: f32, facing: Facing) -> Entity {
        let profile: GuestProfile = serde_json::from_value(serde_json::json!({
            "id": id,
            "name": id,
            "mask": "gold",
            "personality": "confident",
            "frequented_room": "ballroom"
        }))
        .unwrap();
        world.spawn((
            profile,
            Position::new(x, y, RoomId::Ballroom),
            Velocity::default(),
            facing,
            Behavior::new(3000.0),
            LocalSuspicion::default(),
            Alive,
        ))
    }

    #[test]
    fn test_behind_uses_facing_when_still() {
        let guest = Vec2::new(100.0, 100.0);
        let north = Vec2::new(100.0, 80.0);
        let south = Vec2::new(100.0, 120.0);
        assert!(is_player_behind(&north, &guest, &Vec2::ZERO, Facing::Down));
        assert!(!is_player_behind(&south, &guest, &Vec2::ZERO, Facing::Down));
        assert!(is_player_behind(&south, &guest, &Vec2::ZERO, Facing::Up));
        assert!(is_player_behind(&Vec2::new(120.0, 100.0), &guest, &Vec2::ZERO, Facing::Left));
        assert!(is_player_behind(&Vec2::new(80.0, 100.0), &guest, &Vec2::ZERO, Facing::Right));
    }

    #[test]
    fn test_behind_uses_heading_when_moving() {
        let guest = Vec2::new(100.0, 100.0);
        let west = Vec2::new(70.0, 100.0);
        // Walking east: behind is west, regardless of stale facing
        assert!(is_player_behind(&west, &guest, &Vec2::new(60.0, 10.0), Facing::Left));
        assert!(!is_player_behind(&west, &guest, &Vec2::new(-60.0, 10.0), Facing::Right));
        // Walking north
        assert!(is_player_behind(&Vec2::new(100.0, 130.0), &guest, &Vec2::new(0.0, -60.0), Facing::Down));
    }

    #[test]
    fn test_silent_backstab() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let config = GameConfig::default();
        let victim = spawn_guest(&mut world, "victim", 100.0, 100.0, Facing::Down);
        let player = Player::new(Vec2::new(100.0, 70.0));

        let outcome = attempt_kill(&mut world, &mut state, &player, victim, &config).unwrap();
        let KillOutcome::Executed(report) = outcome else {
            panic!("expected a kill, got {outcome:?}");
        };
        assert!(report.backstab && report.silent);
        assert_eq!(state.suspicion_level, 0.0);
        assert!(world.get::<&Alive>(victim).is_err());
        assert_eq!(world.query::<&Corpse>().iter().count(), 1);
        assert_eq!(state.end_reason, Some(EndReason::KilledInnocent));
    }

    #[test]
    fn test_witnessed_frontal_kill() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let config = GameConfig::default();
        let victim = spawn_guest(&mut world, "victim", 100.0, 100.0, Facing::Down);
        let witness = spawn_guest(&mut world, "witness", 200.0, 100.0, Facing::Down);
        let bystander = spawn_guest(&mut world, "bystander", 280.0, 100.0, Facing::Down);
        let player = Player::new(Vec2::new(100.0, 130.0));

        let outcome = attempt_kill(&mut world, &mut state, &player, victim, &config).unwrap();
        let KillOutcome::Executed(report) = outcome else {
            panic!("expected a kill, got {outcome:?}");
        };
        assert!(!report.backstab && !report.silent);
        assert_eq!(report.witnesses, vec![witness]);
        assert_eq!(state.suspicion_level, 80.0);
        assert!(world.get::<&Behavior>(witness).unwrap().is_alarmed());
        // Out of sight but within earshot
        assert_eq!(world.get::<&Behavior>(bystander).unwrap().state, BehaviorState::Curious);
    }

    #[test]
    fn test_loud_kill_without_witnesses() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let config = GameConfig::default();
        let victim = spawn_guest(&mut world, "victim", 100.0, 100.0, Facing::Down);
        // Beyond the witness radius, inside the noise radius
        let east = spawn_guest(&mut world, "east", 270.0, 100.0, Facing::Down);
        let south = spawn_guest(&mut world, "south", 100.0, 280.0, Facing::Down);
        let player = Player::new(Vec2::new(100.0, 130.0));

        let outcome = attempt_kill(&mut world, &mut state, &player, victim, &config).unwrap();
        let KillOutcome::Executed(report) = outcome else {
            panic!("expected a kill, got {outcome:?}");
        };
        assert!(!report.backstab && !report.silent);
        assert!(report.witnesses.is_empty());
        assert_eq!(state.suspicion_level, 30.0);

        for guest in [east, south] {
            let behavior = world.get::<&Behavior>(guest).unwrap();
            assert_eq!(behavior.state, BehaviorState::Curious);
        }
        assert!(!state
            .pending_events()
            .iter()
            .any(|e| matches!(e, GameEvent::GuestAlarmed { .. })));
    }

    #[test]
    fn test_out_of_range_changes_nothing() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let config = GameConfig::default();
        let victim = spawn_guest(&mut world, "victim", 100.0, 100.0, Facing::Down);
        let player = Player::new(Vec2::new(100.0, 150.0));

        let outcome = attempt_kill(&mut world, &mut state, &player, victim, &config).unwrap();
        assert_eq!(outcome, KillOutcome::OutOfRange { distance: 50.0 });
        assert!(world.get::<&Alive>(victim).is_ok());
        assert!(!state.is_game_over);
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_dead_guest_is_ignored() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let config = GameConfig::default();
        let victim = spawn_guest(&mut world, "victim", 100.0, 100.0, Facing::Down);
        world.remove_one::<Alive>(victim).unwrap();
        let player = Player::new(Vec2::new(100.0, 90.0));

        let outcome = attempt_kill(&mut world, &mut state, &player, victim, &config).unwrap();
        assert_eq!(outcome, KillOutcome::Ignored);
    }

    #[test]
    fn test_target_kill_does_not_end_game() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let config = GameConfig::default();
        let victim = spawn_guest(&mut world, "victim", 100.0, 100.0, Facing::Down);
        world.get::<&mut GuestProfile>(victim).unwrap().is_target = true;
        let player = Player::new(Vec2::new(100.0, 70.0));

        let outcome = attempt_kill(&mut world, &mut state, &player, victim, &config).unwrap();
        assert!(matches!(outcome, KillOutcome::Executed(KillReport { was_target: true, .. })));
        assert!(!state.is_game_over);
    }

    #[test]
    fn test_unknown_entity() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let stray = world.spawn((Alive,));
        let player = Player::new(Vec2::ZERO);
        let result = attempt_kill(&mut world, &mut state, &player, stray, &GameConfig::default());
        assert!(matches!(result, Err(EngineError::UnknownGuest(e)) if e == stray));
    }
}
