//! Manor layout - room bounds, walkable areas, spawn grids and doors

use serde::{Deserialize, Serialize};

use crate::components::{Rect, RoomId, Vec2};
use crate::config::WorldConfig;

/// Spawn grid columns and rows per room
const SPAWN_COLUMNS: usize = 4;
const SPAWN_ROWS: usize = 3;

/// A door zone leading to another room
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub position: Vec2,
    pub target_room: RoomId,
    /// Where the player appears in the target room
    pub spawn_position: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomLayout {
    pub id: RoomId,
    pub bounds: Rect,
    /// Area wander targets are sampled from
    pub walkable: Rect,
    pub spawn_points: Vec<Vec2>,
    pub doors: Vec<Door>,
}

impl RoomLayout {
    fn new(id: RoomId, config: &WorldConfig, doors: Vec<Door>) -> Self {
        let bounds = Rect::new(0.0, 0.0, config.room_width(), config.room_height());
        let walkable = bounds.inset(config.walkable_margin_tiles * config.tile_size);
        let spawn_area = bounds.inset(config.spawn_margin_tiles * config.tile_size);

        let mut spawn_points = Vec::with_capacity(SPAWN_COLUMNS * SPAWN_ROWS);
        for i in 0..SPAWN_COLUMNS {
            for j in 0..SPAWN_ROWS {
                spawn_points.push(Vec2::new(
                    spawn_area.x + i as f32 * spawn_area.width / (SPAWN_COLUMNS - 1) as f32,
                    spawn_area.y + j as f32 * spawn_area.height / (SPAWN_ROWS - 1) as f32,
                ));
            }
        }

        Self {
            id,
            bounds,
            walkable,
            spawn_points,
            doors,
        }
    }

    /// Spawn point for the `nth` guest placed in this room
    pub fn spawn_point(&self, nth: usize) -> Vec2 {
        self.spawn_points[nth % self.spawn_points.len()]
    }

    /// First door whose zone is strictly within `range` of `position`
    pub fn door_near(&self, position: &Vec2, range: f32) -> Option<&Door> {
        self.doors
            .iter()
            .find(|door| door.position.distance(position) < range)
    }
}

/// All four rooms, indexed by `RoomId`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manor {
    rooms: Vec<RoomLayout>,
}

impl Manor {
    pub fn new(config: &WorldConfig) -> Self {
        let tile = config.tile_size;
        let width = config.room_width();
        let height = config.room_height();
        let center = Vec2::new(width / 2.0, height / 2.0);

        // Arrival points just inside each wall
        let arrive_top = Vec2::new(center.x, tile * 2.0);
        let arrive_bottom = Vec2::new(center.x, height - tile * 2.0);
        let arrive_left = Vec2::new(tile * 2.0, center.y);
        let arrive_right = Vec2::new(width - tile * 2.0, center.y);

        let door_top = Vec2::new(center.x, tile * 1.5);
        let door_bottom = Vec2::new(center.x, height - tile * 1.5);
        let door_left = Vec2::new(tile * 1.5, center.y);
        let door_right = Vec2::new(width - tile * 1.5, center.y);

        let ballroom = RoomLayout::new(
            RoomId::Ballroom,
            config,
            vec![
                Door {
                    position: door_top,
                    target_room: RoomId::Garden,
                    spawn_position: arrive_bottom,
                },
                Door {
                    position: door_left,
                    target_room: RoomId::Library,
                    spawn_position: arrive_right,
                },
                Door {
                    position: door_bottom,
                    target_room: RoomId::Cellar,
                    spawn_position: arrive_top,
                },
            ],
        );
        let garden = RoomLayout::new(
            RoomId::Garden,
            config,
            vec![Door {
                position: door_bottom,
                target_room: RoomId::Ballroom,
                spawn_position: arrive_top,
            }],
        );
        let library = RoomLayout::new(
            RoomId::Library,
            config,
            vec![Door {
                position: door_right,
                target_room: RoomId::Ballroom,
                spawn_position: arrive_left,
            }],
        );
        let cellar = RoomLayout::new(
            RoomId::Cellar,
            config,
            vec![Door {
                position: door_top,
                target_room: RoomId::Ballroom,
                spawn_position: arrive_bottom,
            }],
        );

        // Order matches RoomId::index
        Self {
            rooms: vec![ballroom, garden, library, cellar],
        }
    }

    pub fn room(&self, id: RoomId) -> &RoomLayout {
        &self.rooms[id.index()]
    }

    pub fn rooms(&self) -> &[RoomLayout] {
        &self.rooms
    }
}
