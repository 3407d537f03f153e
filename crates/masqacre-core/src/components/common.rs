//! Common components used across multiple entity types.

use serde::{Deserialize, Serialize};

use super::RoomId;

/// 2D position vector in room-local pixel units (y grows downward)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Unit vector pointing from `self` toward `target`, scaled by `speed`
    pub fn toward(&self, target: &Self, speed: f32) -> Self {
        (*target - *self).normalize() * speed
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Axis-aligned rectangle (origin + size)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Shrink the rectangle by `margin` on every side
    pub fn inset(&self, margin: f32) -> Self {
        Self {
            x: self.x + margin,
            y: self.y + margin,
            width: (self.width - margin * 2.0).max(0.0),
            height: (self.height - margin * 2.0).max(0.0),
        }
    }

    pub fn contains(&self, point: &Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.x, self.x + self.width),
            point.y.clamp(self.y, self.y + self.height),
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Uniform random point inside the rectangle
    pub fn sample(&self, rng: &mut impl rand::Rng) -> Vec2 {
        Vec2::new(
            self.x + rng.gen::<f32>() * self.width,
            self.y + rng.gen::<f32>() * self.height,
        )
    }
}

/// Spatial position component - where an entity is located
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    /// Local position within the room
    pub local: Vec2,
    /// Room this entity belongs to. Used as a simulation filter key.
    pub room: RoomId,
}

impl Position {
    pub fn new(x: f32, y: f32, room: RoomId) -> Self {
        Self {
            local: Vec2::new(x, y),
            room,
        }
    }

    pub fn at(local: Vec2, room: RoomId) -> Self {
        Self { local, room }
    }
}

/// Current velocity in units per second
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Velocity(pub Vec2);

/// Cardinal facing direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Facing implied by a velocity, picking the dominant axis.
    /// Returns `None` for a zero velocity.
    pub fn from_velocity(velocity: Vec2) -> Option<Self> {
        if velocity.is_zero() {
            return None;
        }
        Some(if velocity.x.abs() > velocity.y.abs() {
            if velocity.x > 0.0 {
                Facing::Right
            } else {
                Facing::Left
            }
        } else if velocity.y > 0.0 {
            Facing::Down
        } else {
            Facing::Up
        })
    }
}
