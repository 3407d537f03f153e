//! Guest-related components: profiles, behavior state, local suspicion, corpses.

use serde::{Deserialize, Serialize};

use super::Vec2;

/// The four rooms of the manor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomId {
    Ballroom,
    Garden,
    Library,
    Cellar,
}

impl RoomId {
    pub const ALL: [RoomId; 4] = [
        RoomId::Ballroom,
        RoomId::Garden,
        RoomId::Library,
        RoomId::Cellar,
    ];

    /// Canonical string used for clue matching
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomId::Ballroom => "ballroom",
            RoomId::Garden => "garden",
            RoomId::Library => "library",
            RoomId::Cellar => "cellar",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RoomId::Ballroom => "Grand Ballroom",
            RoomId::Garden => "Moonlit Garden",
            RoomId::Library => "Library",
            RoomId::Cellar => "Wine Cellar",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mask colors worn by guests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskColor {
    Red,
    Blue,
    Green,
    Gold,
    Silver,
    Purple,
    Black,
    White,
}

impl MaskColor {
    pub const ALL: [MaskColor; 8] = [
        MaskColor::Red,
        MaskColor::Blue,
        MaskColor::Green,
        MaskColor::Gold,
        MaskColor::Silver,
        MaskColor::Purple,
        MaskColor::Black,
        MaskColor::White,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaskColor::Red => "red",
            MaskColor::Blue => "blue",
            MaskColor::Green => "green",
            MaskColor::Gold => "gold",
            MaskColor::Silver => "silver",
            MaskColor::Purple => "purple",
            MaskColor::Black => "black",
            MaskColor::White => "white",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            MaskColor::Red => "a crimson mask, like blood",
            MaskColor::Blue => "a sapphire mask, deep as the sea",
            MaskColor::Green => "an emerald mask, like the forest",
            MaskColor::Gold => "a golden mask, gleaming bright",
            MaskColor::Silver => "a silver mask, like moonlight",
            MaskColor::Purple => "a purple mask, dark and regal",
            MaskColor::Black => "a black mask, shrouded in shadow",
            MaskColor::White => "a white mask, pale as bone",
        }
    }
}

/// Dominant personality trait of a guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Nervous,
    Confident,
    Secretive,
    Gossipy,
    Aloof,
    Friendly,
}

impl Personality {
    pub const ALL: [Personality; 6] = [
        Personality::Nervous,
        Personality::Confident,
        Personality::Secretive,
        Personality::Gossipy,
        Personality::Aloof,
        Personality::Friendly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Nervous => "nervous",
            Personality::Confident => "confident",
            Personality::Secretive => "secretive",
            Personality::Gossipy => "gossipy",
            Personality::Aloof => "aloof",
            Personality::Friendly => "friendly",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Personality::Nervous => "nervous and easily startled",
            Personality::Confident => "confident and self-assured",
            Personality::Secretive => "secretive and guarded",
            Personality::Gossipy => "talkative and gossipy",
            Personality::Aloof => "aloof and distant",
            Personality::Friendly => "friendly and approachable",
        }
    }
}

/// Role at the party. Guards can never be the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestRole {
    #[default]
    Guest,
    Guard,
}

/// Static guest definition, loaded once from the roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestProfile {
    pub id: String,
    pub name: String,
    pub mask: MaskColor,
    pub personality: Personality,
    pub frequented_room: RoomId,
    #[serde(default)]
    pub role: GuestRole,
    #[serde(default)]
    pub secrets: Vec<String>,
    /// Rumors this guest knows about others (dialogue flavor)
    #[serde(default)]
    pub known_info: Vec<String>,
    /// Only these guests offer interrogation topics
    #[serde(default)]
    pub has_rich_dialogue: bool,
    /// Assigned exactly once per game by target selection
    #[serde(skip)]
    pub is_target: bool,
}

impl GuestProfile {
    pub fn is_target_eligible(&self) -> bool {
        self.role != GuestRole::Guard
    }
}

/// Behavior states, ordered by escalation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorState {
    #[default]
    Idle,
    Wandering,
    Socializing,
    Curious,
    Suspicious,
    Alarmed,
}

impl BehaviorState {
    /// Calm states can be startled by noise
    pub fn is_calm(&self) -> bool {
        matches!(
            self,
            BehaviorState::Idle | BehaviorState::Wandering | BehaviorState::Socializing
        )
    }
}

/// Per-guest behavior state machine data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Behavior {
    pub state: BehaviorState,
    /// Milliseconds spent in the current state
    pub state_timer: f32,
    /// Milliseconds spent idling since the last idle roll
    pub idle_time: f32,
    pub max_idle_time: f32,
    pub wander_target: Option<Vec2>,
}

impl Behavior {
    pub fn new(max_idle_time: f32) -> Self {
        Self {
            state: BehaviorState::Idle,
            state_timer: 0.0,
            idle_time: 0.0,
            max_idle_time,
            wander_target: None,
        }
    }

    fn enter(&mut self, state: BehaviorState) {
        self.state = state;
        self.state_timer = 0.0;
    }

    pub fn start_wandering(&mut self, target: Vec2) {
        self.enter(BehaviorState::Wandering);
        self.wander_target = Some(target);
    }

    pub fn start_socializing(&mut self) {
        self.enter(BehaviorState::Socializing);
    }

    /// No-op once alarmed
    pub fn become_curious(&mut self) {
        if self.state != BehaviorState::Alarmed {
            self.enter(BehaviorState::Curious);
        }
    }

    /// No-op once alarmed
    pub fn become_suspicious(&mut self) {
        if self.state != BehaviorState::Alarmed {
            self.enter(BehaviorState::Suspicious);
        }
    }

    /// Returns true if the guest was not already alarmed
    pub fn become_alarmed(&mut self) -> bool {
        let newly = self.state != BehaviorState::Alarmed;
        self.enter(BehaviorState::Alarmed);
        newly
    }

    /// Back to idle, clearing any wander target. The only way out of `Alarmed`.
    pub fn reset(&mut self) {
        self.enter(BehaviorState::Idle);
        self.idle_time = 0.0;
        self.wander_target = None;
    }

    pub fn is_alarmed(&self) -> bool {
        self.state == BehaviorState::Alarmed
    }
}

/// Guest-local detection accumulator, independent of the global meter
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LocalSuspicion(pub f32);

/// Marker for living guests. Removed on elimination, never restored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Alive;

/// A body left behind by an elimination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpse {
    pub guest_id: String,
}

/// One-way marker added to the target once identified
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MarkedTarget;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alarmed_is_never_downgraded() {
        let mut behavior = Behavior::new(3000.0);
        assert!(behavior.become_alarmed());
        behavior.state_timer = 1200.0;

        behavior.become_curious();
        assert_eq!(behavior.state, BehaviorState::Alarmed);
        behavior.become_suspicious();
        assert_eq!(behavior.state, BehaviorState::Alarmed);
        // Untouched by the refused transitions
        assert_eq!(behavior.state_timer, 1200.0);

        assert!(!behavior.become_alarmed());
        assert_eq!(behavior.state_timer, 0.0);
    }

    #[test]
    fn test_forced_transitions_reset_timer() {
        let mut behavior = Behavior::new(3000.0);
        behavior.state_timer = 400.0;
        behavior.become_suspicious();
        assert_eq!(behavior.state, BehaviorState::Suspicious);
        assert_eq!(behavior.state_timer, 0.0);

        behavior.state_timer = 400.0;
        behavior.become_curious();
        assert_eq!(behavior.state, BehaviorState::Curious);
        assert_eq!(behavior.state_timer, 0.0);
    }

    #[test]
    fn test_reset_leaves_alarm() {
        let mut behavior = Behavior::new(3000.0);
        behavior.become_alarmed();
        behavior.reset();
        assert_eq!(behavior.state, BehaviorState::Idle);
    }

    #[test]
    fn test_profile_deserializes_lowercase() {
        let json = r#"{
            "id": "lady_rose",
            "name": "Lady Rose",
            "mask": "red",
            "personality": "gossipy",
            "frequented_room": "garden"
        }"#;
        let profile: GuestProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.mask, MaskColor::Red);
        assert_eq!(profile.frequented_room, RoomId::Garden);
        assert_eq!(profile.role, GuestRole::Guest);
        assert!(!profile.has_rich_dialogue);
        assert!(!profile.is_target);
        assert!(profile.is_target_eligible());
    }
}
