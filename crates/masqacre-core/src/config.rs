//! Game configuration - tunables for the simulation.
//!
//! Defaults reproduce the shipped balance. Every section deserializes with
//! `#[serde(default)]`, so a JSON document only needs the values it overrides:
//!
//! ```
//! use masqacre_core::config::GameConfig;
//!
//! let config = GameConfig::from_json(r#"{ "clock": { "game_time_seconds": 120 } }"#).unwrap();
//! assert_eq!(config.clock.game_time_seconds, 120.0);
//! assert_eq!(config.perception.vision_range, 150.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Ceiling of the global suspicion meter. Reaching it ends the game.
pub const SUSPICION_MAX: f32 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub clock: ClockConfig,
    pub movement: MovementConfig,
    pub behavior: BehaviorConfig,
    pub perception: PerceptionConfig,
    pub suspicion: SuspicionConfig,
    pub combat: CombatConfig,
}

/// Room geometry, in tiles of `tile_size` units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub tile_size: f32,
    pub room_width_tiles: f32,
    pub room_height_tiles: f32,
    /// Inset from the walls for wander targets
    pub walkable_margin_tiles: f32,
    /// Inset from the walls for the spawn grid
    pub spawn_margin_tiles: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            room_width_tiles: 25.0,
            room_height_tiles: 19.0,
            walkable_margin_tiles: 2.0,
            spawn_margin_tiles: 3.0,
        }
    }
}

impl WorldConfig {
    pub fn room_width(&self) -> f32 {
        self.room_width_tiles * self.tile_size
    }

    pub fn room_height(&self) -> f32 {
        self.room_height_tiles * self.tile_size
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub game_time_seconds: f32,
    pub chime_interval_seconds: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            game_time_seconds: 300.0,
            chime_interval_seconds: 60.0,
        }
    }
}

/// Speeds in units per second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub player_speed: f32,
    pub player_sneak_speed: f32,
    pub npc_chase_speed: f32,
    pub npc_wander_speed: f32,
    /// A wandering guest this close to its target has arrived
    pub arrive_distance: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            player_speed: 160.0,
            player_sneak_speed: 80.0,
            npc_chase_speed: 100.0,
            npc_wander_speed: 60.0,
            arrive_distance: 10.0,
        }
    }
}

/// State machine timings, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub idle_min_ms: f32,
    /// Idle duration is `idle_min_ms + [0, idle_jitter_ms)`
    pub idle_jitter_ms: f32,
    /// Probability an idle roll picks wandering over socializing
    pub wander_chance: f32,
    pub socialize_ms: f32,
    pub curious_ms: f32,
    pub suspicious_ms: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            idle_min_ms: 2000.0,
            idle_jitter_ms: 3000.0,
            wander_chance: 0.6,
            socialize_ms: 5000.0,
            curious_ms: 3000.0,
            suspicious_ms: 5000.0,
        }
    }
}

/// Detection model. Gains and local decay are flat per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    pub vision_range: f32,
    pub close_range: f32,
    pub moving_gain: f32,
    pub close_gain: f32,
    pub local_decay: f32,
    pub curious_threshold: f32,
    pub suspicious_threshold: f32,
    pub alarmed_threshold: f32,
    /// Global suspicion pushed when a guest turns curious
    pub curious_penalty: f32,
    pub suspicious_penalty: f32,
    pub alarmed_penalty: f32,
    pub corpse_discovery_radius: f32,
    pub corpse_discovery_penalty: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            vision_range: 150.0,
            close_range: 50.0,
            moving_gain: 0.05,
            close_gain: 0.02,
            local_decay: 0.01,
            curious_threshold: 25.0,
            suspicious_threshold: 50.0,
            alarmed_threshold: 75.0,
            curious_penalty: 5.0,
            suspicious_penalty: 10.0,
            alarmed_penalty: 20.0,
            corpse_discovery_radius: 100.0,
            corpse_discovery_penalty: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionConfig {
    /// Passive decay in points per second while nobody is alarmed
    pub decay_per_second: f32,
    /// Level at or above which the meter reads as high alert
    pub high_alert_level: f32,
}

impl Default for SuspicionConfig {
    fn default() -> Self {
        Self {
            decay_per_second: 0.5,
            high_alert_level: 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Reach for kills, conversations and doors, in tiles
    pub interaction_range_tiles: f32,
    pub witness_radius: f32,
    pub noise_radius: f32,
    pub loud_kill_penalty: f32,
    pub witnessed_kill_penalty: f32,
    /// Delay before a target kill is declared a win
    pub victory_grace_ms: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            interaction_range_tiles: 1.5,
            witness_radius: 150.0,
            noise_radius: 200.0,
            loud_kill_penalty: 30.0,
            witnessed_kill_penalty: 50.0,
            victory_grace_ms: 1000.0,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Interaction reach in world units
    pub fn interaction_range(&self) -> f32 {
        self.world.tile_size * self.combat.interaction_range_tiles
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("world.tile_size", self.world.tile_size),
            ("world.room_width_tiles", self.world.room_width_tiles),
            ("world.room_height_tiles", self.world.room_height_tiles),
            ("clock.game_time_seconds", self.clock.game_time_seconds),
            ("clock.chime_interval_seconds", self.clock.chime_interval_seconds),
            ("movement.player_speed", self.movement.player_speed),
            ("movement.player_sneak_speed", self.movement.player_sneak_speed),
            ("movement.npc_chase_speed", self.movement.npc_chase_speed),
            ("movement.npc_wander_speed", self.movement.npc_wander_speed),
            ("perception.vision_range", self.perception.vision_range),
            ("combat.interaction_range_tiles", self.combat.interaction_range_tiles),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        let margin = self.world.walkable_margin_tiles.max(self.world.spawn_margin_tiles) * 2.0;
        if margin >= self.world.room_width_tiles.min(self.world.room_height_tiles) {
            return Err(ConfigError::Invalid(
                "room margins leave no walkable area".to_string(),
            ));
        }

        let p = &self.perception;
        if !(p.curious_threshold < p.suspicious_threshold
            && p.suspicious_threshold < p.alarmed_threshold)
        {
            return Err(ConfigError::Invalid(format!(
                "perception thresholds must increase: {} < {} < {}",
                p.curious_threshold, p.suspicious_threshold, p.alarmed_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.behavior.wander_chance) {
            return Err(ConfigError::Invalid(format!(
                "behavior.wander_chance must be within [0, 1], got {}",
                self.behavior.wander_chance
            )));
        }

        Ok(())
    }
}
