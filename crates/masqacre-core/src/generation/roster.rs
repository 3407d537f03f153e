//! Guest roster loading and validation

use std::collections::HashSet;

use crate::components::GuestProfile;
use crate::error::RosterError;

/// The shipped guest list
const DEFAULT_ROSTER_JSON: &str = include_str!("../../data/guests.json");

/// Parse the built-in roster
pub fn default_roster() -> Result<Vec<GuestProfile>, RosterError> {
    parse_roster(DEFAULT_ROSTER_JSON)
}

/// Parse and validate a roster from JSON
pub fn parse_roster(json: &str) -> Result<Vec<GuestProfile>, RosterError> {
    let roster: Vec<GuestProfile> = serde_json::from_str(json)?;
    validate_roster(&roster)?;
    Ok(roster)
}

pub fn validate_roster(roster: &[GuestProfile]) -> Result<(), RosterError> {
    if roster.is_empty() {
        return Err(RosterError::Empty);
    }

    let mut seen = HashSet::with_capacity(roster.len());
    for guest in roster {
        if !seen.insert(guest.id.as_str()) {
            return Err(RosterError::DuplicateId(guest.id.clone()));
        }
    }

    if !roster.iter().any(GuestProfile::is_target_eligible) {
        return Err(RosterError::NoEligibleTarget);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::RoomId;

    #[test]
    fn test_default_roster_loads() {
        let roster = default_roster().unwrap();
        assert_eq!(roster.len(), 17);

        let per_room = |room: RoomId| roster.iter().filter(|g| g.frequented_room == room).count();
        assert_eq!(per_room(RoomId::Ballroom), 6);
        assert_eq!(per_room(RoomId::Garden), 4);
        assert_eq!(per_room(RoomId::Library), 4);
        assert_eq!(per_room(RoomId::Cellar), 3);

        assert_eq!(roster.iter().filter(|g| g.has_rich_dialogue).count(), 5);
    }

    #[test]
    fn test_rejects_duplicates() {
        let json = r#"[
            { "id": "a", "name": "A", "mask": "red", "personality": "aloof", "frequented_room": "cellar" },
            { "id": "a", "name": "B", "mask": "blue", "personality": "aloof", "frequented_room": "cellar" }
        ]"#;
        assert!(matches!(parse_roster(json), Err(RosterError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn test_rejects_guard_only_roster() {
        let json = r#"[
            { "id": "guard_1", "name": "Guard", "mask": "black", "personality": "aloof",
              "frequented_room": "ballroom", "role": "guard" }
        ]"#;
        assert!(matches!(parse_roster(json), Err(RosterError::NoEligibleTarget)));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(parse_roster("[]"), Err(RosterError::Empty)));
    }
}
