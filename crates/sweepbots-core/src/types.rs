//! Core type definitions for the world model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a tracked dynamic entity.
///
/// Robot ids are assigned by the wire protocol; trash item ids are
/// allocated locally from a separate namespace. Unique among concurrently
/// active entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of dynamic entity tracked by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Robot,
    TrashItem,
}

/// Height robots sit at above the ground plane.
pub const ROBOT_LIFT: f32 = 0.344;

/// Grid coordinates. Row 0 is the first matrix line of the map text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Ground-level world position: columns run along +X, rows along -Z.
    pub fn ground(&self) -> WorldPos {
        WorldPos {
            x: self.col as f32,
            y: 0.0,
            z: -(self.row as f32),
        }
    }

    /// World position for an entity of the given kind at this cell.
    pub fn to_world(&self, kind: EntityKind) -> WorldPos {
        let mut pos = self.ground();
        if kind == EntityKind::Robot {
            pos.y = ROBOT_LIFT;
        }
        pos
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// 3D position handed to the render bridge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Static cell classification parsed from the map text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Obstacle,
    TrashBin,
    SpawnPoint,
    TrashPile(u32),
}

impl CellKind {
    /// Classify one map token. Unrecognized tokens are Empty.
    pub fn from_token(token: &str) -> Self {
        match token {
            "X" => CellKind::Obstacle,
            "P" => CellKind::TrashBin,
            "S" => CellKind::SpawnPoint,
            other => match other.parse::<u32>() {
                Ok(count) if count > 0 => CellKind::TrashPile(count),
                _ => CellKind::Empty,
            },
        }
    }

    /// Obstacles double as trash sources, so both they and piles yield a
    /// collectible TrashItem at bootstrap.
    pub fn spawns_trash(&self) -> bool {
        matches!(self, CellKind::Obstacle | CellKind::TrashPile(_))
    }
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Empty
    }
}
