//! Interrogation - the gameplay effects of conversation topics.
//!
//! Dialogue text lives with the dialogue collaborator; this module decides
//! which topics a guest offers, what clue a topic reveals, and what a topic
//! costs in suspicion.

use serde::{Deserialize, Serialize};

use super::TargetDossier;
use crate::components::{Clue, ClueCategory, GuestProfile, Personality, RoomId};

/// Topics offered at most per conversation
pub const MAX_TOPICS: usize = 4;

/// Immediate suspicion for choosing to threaten
const THREATEN_COST: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Guests,
    Masks,
    Locations,
    Behavior,
    Compliment,
    Threaten,
}

impl Topic {
    /// Clue category this topic can reveal
    pub fn clue_category(&self) -> Option<ClueCategory> {
        match self {
            Topic::Masks => Some(ClueCategory::Mask),
            Topic::Locations => Some(ClueCategory::Location),
            Topic::Behavior => Some(ClueCategory::Behavior),
            Topic::Guests | Topic::Compliment | Topic::Threaten => None,
        }
    }
}

/// Topics a guest will entertain, in menu order
pub fn available_topics(guest: &GuestProfile) -> Vec<Topic> {
    if !guest.has_rich_dialogue {
        return Vec::new();
    }

    let mut topics = vec![Topic::Guests, Topic::Masks, Topic::Locations, Topic::Behavior];
    if guest.personality == Personality::Nervous {
        topics.push(Topic::Threaten);
    }
    if matches!(guest.personality, Personality::Friendly | Personality::Gossipy) {
        topics.insert(0, Topic::Compliment);
    }
    topics.truncate(MAX_TOPICS);
    topics
}

fn location_phrase(room: RoomId) -> &'static str {
    match room {
        RoomId::Ballroom => "the ballroom, among the dancers",
        RoomId::Garden => "the garden, among the hedges",
        RoomId::Library => "the library, among the books",
        RoomId::Cellar => "the cellar, in the shadows",
    }
}

/// The clue a guest gives on `topic`, always describing the actual target
pub fn clue_for_topic(guest: &GuestProfile, topic: Topic, target: &TargetDossier) -> Option<Clue> {
    if !guest.has_rich_dialogue {
        return None;
    }

    let category = topic.clue_category()?;
    let value = target.match_value(category);
    let description = match category {
        ClueCategory::Mask => format!("The one you seek wears {}", target.mask.describe()),
        ClueCategory::Location => {
            format!("Your target frequents {}", location_phrase(target.location))
        }
        ClueCategory::Behavior => format!("The one you hunt is {}", target.behavior.describe()),
    };
    Some(Clue::new(category, description, value))
}

/// Suspicion paid when the topic is chosen
pub fn topic_cost(topic: Topic) -> f32 {
    match topic {
        Topic::Threaten => THREATEN_COST,
        _ => 0.0,
    }
}

/// Suspicion paid when walking away after the topic
pub fn parting_cost(guest: &GuestProfile, topic: Topic) -> f32 {
    match (topic, guest.personality) {
        (Topic::Threaten, Personality::Nervous) => 5.0,
        (Topic::Threaten, _) => 15.0,
        _ => 0.0,
    }
}
