//! Clue ledger - one write-once slot per category, and target identification

use hecs::World;

use super::TargetDossier;
use crate::components::{Clue, ClueCategory, MarkedTarget};
use crate::state::{GameEvent, GameState};

/// Record a clue unless its category is already filled.
///
/// Returns true if the clue was added. A filled slot is never overwritten,
/// so a wrong clue blocks identification for the rest of the session.
pub fn discover_clue(
    world: &mut World,
    state: &mut GameState,
    target: Option<&TargetDossier>,
    clue: Clue,
) -> bool {
    if clue_for_category(state, clue.category).is_some() {
        log::debug!("Already have a {} clue", clue.category);
        return false;
    }

    log::info!("New clue discovered: {}", clue.description);
    state.discovered_clues.push(clue.clone());
    state.emit(GameEvent::ClueDiscovered(clue));

    if let Some(target) = target {
        check_identification(world, state, target);
    }
    true
}

/// True when every category holds a clue matching the target
pub fn target_identified(state: &GameState, target: &TargetDossier) -> bool {
    has_all_clues(state) && state.discovered_clues.iter().all(|clue| target.matches(clue))
}

fn check_identification(world: &mut World, state: &mut GameState, target: &TargetDossier) {
    if state.has_identified_target || !target_identified(state, target) {
        return;
    }

    state.has_identified_target = true;
    if let Some(entity) = target.entity {
        if world.insert_one(entity, MarkedTarget).is_err() {
            log::warn!("Target entity for {} no longer exists", target.id);
        }
    }
    log::info!("Target identified: {}", target.name);
    state.emit(GameEvent::TargetIdentified);
}

pub fn clue_for_category(state: &GameState, category: ClueCategory) -> Option<&Clue> {
    state
        .discovered_clues
        .iter()
        .find(|clue| clue.category == category)
}

pub fn has_all_clues(state: &GameState) -> bool {
    ClueCategory::ALL
        .iter()
        .all(|category| clue_for_category(state, *category).is_some())
}

pub fn clue_count(state: &GameState) -> usize {
    state.discovered_clues.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::*;

    fn red_library_nervous(world: &mut World) -> TargetDossier {
        let profile: GuestProfile = serde_json::from_value(serde_json::json!({
            "id": "lord_crimson",
            "name": "Lord Crimson",
            "mask": "red",
            "personality": "nervous",
            "frequented_room": "library"
        }))
        .unwrap();
        let entity = world.spawn((profile.clone(), Alive));
        TargetDossier::from_profile(&profile, entity)
    }

    #[test]
    fn test_matching_clues_identify_in_any_order() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let target = red_library_nervous(&mut world);

        assert!(discover_clue(&mut world, &mut state, Some(&target), Clue::behavior("nervous")));
        assert!(discover_clue(&mut world, &mut state, Some(&target), Clue::mask("red")));
        assert!(!state.has_identified_target);
        assert!(discover_clue(&mut world, &mut state, Some(&target), Clue::location("library")));

        assert!(state.has_identified_target);
        assert!(world.get::<&MarkedTarget>(target.entity.unwrap()).is_ok());
        let events = state.drain_events();
        assert_eq!(events.last(), Some(&GameEvent::TargetIdentified));
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::ClueDiscovered(_))).count(),
            3
        );
    }

    #[test]
    fn test_second_clue_in_category_is_ignored() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let target = red_library_nervous(&mut world);

        discover_clue(&mut world, &mut state, Some(&target), Clue::mask("blue"));
        assert!(!discover_clue(&mut world, &mut state, Some(&target), Clue::mask("red")));
        assert_eq!(clue_count(&state), 1);
        assert_eq!(
            clue_for_category(&state, ClueCategory::Mask).map(|c| c.match_value.as_str()),
            Some("blue")
        );
    }

    #[test]
    fn test_wrong_mask_blocks_identification() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let target = red_library_nervous(&mut world);

        for clue in [
            Clue::mask("blue"),
            Clue::location("library"),
            Clue::behavior("nervous"),
            Clue::mask("red"),
        ] {
            discover_clue(&mut world, &mut state, Some(&target), clue);
        }

        assert!(has_all_clues(&state));
        assert!(!state.has_identified_target);
        assert!(world.get::<&MarkedTarget>(target.entity.unwrap()).is_err());
    }

    #[test]
    fn test_description_never_matters() {
        let mut world = World::new();
        let mut state = GameState::new(300.0);
        let target = red_library_nervous(&mut world);

        discover_clue(&mut world, &mut state, Some(&target), Clue::new(ClueCategory::Mask, "blue, surely", "red"));
        discover_clue(&mut world, &mut state, Some(&target), Clue::new(ClueCategory::Location, "", "library"));
        discover_clue(&mut world, &mut state, Some(&target), Clue::new(ClueCategory::Behavior, "calm", "nervous"));
        assert!(state.has_identified_target);
    }
}
