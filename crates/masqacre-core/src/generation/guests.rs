//! Guest spawning - turns roster profiles into simulation entities

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::Rng;

use super::Manor;
use crate::components::*;
use crate::config::BehaviorConfig;

/// Randomized idle duration in milliseconds
pub fn roll_idle_time(config: &BehaviorConfig, rng: &mut impl Rng) -> f32 {
    config.idle_min_ms + rng.gen::<f32>() * config.idle_jitter_ms
}

/// Spawn one entity per profile, in its frequented room.
///
/// Guests fill their room's spawn grid in roster order, wrapping around.
pub fn spawn_guests(
    world: &mut World,
    roster: &[GuestProfile],
    manor: &Manor,
    config: &BehaviorConfig,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    let mut placed: HashMap<RoomId, usize> = HashMap::new();
    let mut entities = Vec::with_capacity(roster.len());

    for profile in roster {
        let room = profile.frequented_room;
        let nth = placed.entry(room).or_insert(0);
        let spawn = manor.room(room).spawn_point(*nth);
        *nth += 1;

        let entity = world.spawn((
            profile.clone(),
            Position::at(spawn, room),
            Velocity::default(),
            Facing::default(),
            Behavior::new(roll_idle_time(config, rng)),
            LocalSuspicion::default(),
            Alive,
        ));
        entities.push(entity);
    }

    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::generation::default_roster;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_all_guests() {
        let mut world = World::new();
        let manor = Manor::new(&WorldConfig::default());
        let roster = default_roster().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let entities = spawn_guests(&mut world, &roster, &manor, &BehaviorConfig::default(), &mut rng);
        assert_eq!(entities.len(), roster.len());

        for (entity, profile) in entities.iter().zip(&roster) {
            let pos = world.get::<&Position>(*entity).unwrap();
            assert_eq!(pos.room, profile.frequented_room);
            let behavior = world.get::<&Behavior>(*entity).unwrap();
            assert_eq!(behavior.state, BehaviorState::Idle);
            assert!(behavior.max_idle_time >= 2000.0 && behavior.max_idle_time < 5000.0);
            assert!(world.get::<&Alive>(*entity).is_ok());
        }
    }

    #[test]
    fn test_spawn_points_are_distinct_per_room() {
        let mut world = World::new();
        let manor = Manor::new(&WorldConfig::default());
        let roster = default_roster().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let entities = spawn_guests(&mut world, &roster, &manor, &BehaviorConfig::default(), &mut rng);

        let ballroom: Vec<Vec2> = entities
            .iter()
            .filter_map(|e| {
                let pos = world.get::<&Position>(*e).ok()?;
                (pos.room == RoomId::Ballroom).then_some(pos.local)
            })
            .collect();
        assert_eq!(ballroom.len(), 6);
        for (i, a) in ballroom.iter().enumerate() {
            for b in &ballroom[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
