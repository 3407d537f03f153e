//! The player character. Not an ECS entity: a single instance owned by the engine.

use serde::{Deserialize, Serialize};

use super::{Facing, Rect, Vec2};
use crate::config::MovementConfig;

/// Diagonal movement scale
const DIAGONAL_FACTOR: f32 = 0.707;

/// Per-tick directional intent supplied by the input collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// -1 (left), 0, or 1 (right)
    pub dx: i8,
    /// -1 (up), 0, or 1 (down)
    pub dy: i8,
    pub sneak: bool,
}

impl PlayerInput {
    pub fn walk(dx: i8, dy: i8) -> Self {
        Self { dx, dy, sneak: false }
    }

    pub fn sneak(dx: i8, dy: i8) -> Self {
        Self { dx, dy, sneak: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub is_sneaking: bool,
    /// Set while a conversation is open; movement is suppressed
    pub frozen: bool,
    pub intent: PlayerInput,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Facing::Down,
            is_sneaking: false,
            frozen: false,
            intent: PlayerInput::default(),
        }
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
        self.velocity = Vec2::ZERO;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    pub fn is_moving(&self) -> bool {
        !self.velocity.is_zero()
    }

    /// 0 when stationary, low when sneaking, full otherwise
    pub fn noise_level(&self) -> f32 {
        if !self.is_moving() {
            0.0
        } else if self.is_sneaking {
            0.2
        } else {
            1.0
        }
    }

    /// Turn the current intent into a velocity and facing
    pub fn steer(&mut self, config: &MovementConfig) {
        if self.frozen {
            self.velocity = Vec2::ZERO;
            return;
        }

        self.is_sneaking = self.intent.sneak;
        let speed = if self.is_sneaking {
            config.player_sneak_speed
        } else {
            config.player_speed
        };

        let dx = self.intent.dx.signum() as f32;
        let dy = self.intent.dy.signum() as f32;
        let mut velocity = Vec2::new(dx * speed, dy * speed);
        if dx != 0.0 && dy != 0.0 {
            velocity = velocity * DIAGONAL_FACTOR;
        }
        self.velocity = velocity;

        // Vertical intent wins the facing when both axes are pressed
        if dy < 0.0 {
            self.facing = Facing::Up;
        } else if dy > 0.0 {
            self.facing = Facing::Down;
        } else if dx < 0.0 {
            self.facing = Facing::Left;
        } else if dx > 0.0 {
            self.facing = Facing::Right;
        }
    }

    /// Advance position by the current velocity, staying inside `bounds`
    pub fn integrate(&mut self, delta_ms: f32, bounds: &Rect) {
        let step = self.velocity * (delta_ms / 1000.0);
        self.position = bounds.clamp(self.position + step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steer_speeds() {
        let config = MovementConfig::default();
        let mut player = Player::new(Vec2::new(100.0, 100.0));

        player.intent = PlayerInput::walk(1, 0);
        player.steer(&config);
        assert_eq!(player.velocity, Vec2::new(160.0, 0.0));
        assert_eq!(player.facing, Facing::Right);
        assert_eq!(player.noise_level(), 1.0);

        player.intent = PlayerInput::sneak(0, -1);
        player.steer(&config);
        assert_eq!(player.velocity, Vec2::new(0.0, -80.0));
        assert_eq!(player.facing, Facing::Up);
        assert_eq!(player.noise_level(), 0.2);
    }

    #[test]
    fn test_diagonal_is_scaled() {
        let config = MovementConfig::default();
        let mut player = Player::new(Vec2::ZERO);
        player.intent = PlayerInput::walk(-1, 1);
        player.steer(&config);
        assert!((player.velocity.x + 160.0 * 0.707).abs() < 0.001);
        assert!((player.velocity.y - 160.0 * 0.707).abs() < 0.001);
        assert_eq!(player.facing, Facing::Down);
    }

    #[test]
    fn test_frozen_player_ignores_intent() {
        let config = MovementConfig::default();
        let mut player = Player::new(Vec2::new(50.0, 50.0));
        player.freeze();
        player.intent = PlayerInput::walk(1, 1);
        player.steer(&config);
        assert!(!player.is_moving());
        assert_eq!(player.noise_level(), 0.0);

        player.unfreeze();
        player.steer(&config);
        assert!(player.is_moving());
    }

    #[test]
    fn test_integrate_clamps_to_bounds() {
        let config = MovementConfig::default();
        let bounds = Rect::new(0.0, 0.0, 800.0, 608.0);
        let mut player = Player::new(Vec2::new(790.0, 300.0));
        player.intent = PlayerInput::walk(1, 0);
        player.steer(&config);
        player.integrate(1000.0, &bounds);
        assert_eq!(player.position, Vec2::new(800.0, 300.0));
    }
}
