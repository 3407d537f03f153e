//! Target selection - picks the hidden ground truth for a session

use hecs::{Entity, World};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::state::GameState;

/// The secretly selected target and the canonical values clues match against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDossier {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    pub entity: Option<Entity>,
    pub mask: MaskColor,
    pub location: RoomId,
    pub behavior: Personality,
}

impl TargetDossier {
    pub fn from_profile(profile: &GuestProfile, entity: Entity) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            entity: Some(entity),
            mask: profile.mask,
            location: profile.frequented_room,
            behavior: profile.personality,
        }
    }

    /// Canonical match value for a clue category
    pub fn match_value(&self, category: ClueCategory) -> &'static str {
        match category {
            ClueCategory::Mask => self.mask.as_str(),
            ClueCategory::Location => self.location.as_str(),
            ClueCategory::Behavior => self.behavior.as_str(),
        }
    }

    pub fn matches(&self, clue: &Clue) -> bool {
        clue.match_value == self.match_value(clue.category)
    }
}

/// Pick one target-eligible guest uniformly at random and flag it.
///
/// Clears `is_target` on everyone else. Returns `None` when nobody is eligible.
pub fn select_target(
    world: &mut World,
    state: &mut GameState,
    rng: &mut impl Rng,
) -> Option<TargetDossier> {
    let mut eligible: Vec<Entity> = world
        .query::<&GuestProfile>()
        .iter()
        .filter(|(_, profile)| profile.is_target_eligible())
        .map(|(entity, _)| entity)
        .collect();
    if eligible.is_empty() {
        return None;
    }
    // Query order depends on archetype layout; sort for seed stability
    eligible.sort_by_key(|entity| entity.id());

    let chosen = eligible[rng.gen_range(0..eligible.len())];

    let mut dossier = None;
    for (entity, profile) in world.query_mut::<&mut GuestProfile>() {
        profile.is_target = entity == chosen;
        if profile.is_target {
            dossier = Some(TargetDossier::from_profile(profile, entity));
        }
    }

    if let Some(target) = &dossier {
        log::info!("Target selected: {} ({} mask)", target.name, target.mask.as_str());
        state.target_id = Some(target.id.clone());
    }
    dossier
}
