//! Level definitions
//!
//! The JSON shape shared with the level editor:
//!
//! ```json
//! {
//!   "name": "tutorial", "difficulty": "easy",
//!   "stars": { "one": 6, "two": 4, "three": 2 },
//!   "cubes": [ { "x": 0, "y": 0, "orientation": { "top": "yellow", ... } } ],
//!   "goals": [ { "x": 1, "y": 0, "top": "yellow" } ]
//! }
//! ```
//!
//! A definition is validated when it is turned into a [`Board`]; a level
//! that fails validation never reaches play.

use std::collections::HashSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::completion::StarThresholds;
use crate::sim::{Board, Color, Cube, FaceMap, Goal};

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("level '{name}' could not be read: {reason}")]
    Unreadable { name: String, reason: String },

    #[error("malformed level JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("level has no cubes")]
    NoCubes,

    #[error("grid size {0} is not positive")]
    InvalidGrid(i32),

    #[error("cube {index} at ({x}, {y}) is outside the grid")]
    CubeOutOfBounds { index: usize, x: i32, y: i32 },

    #[error("two cubes start on ({x}, {y})")]
    DuplicateCube { x: i32, y: i32 },

    #[error("goal {index} at ({x}, {y}) is outside the grid")]
    GoalOutOfBounds { index: usize, x: i32, y: i32 },

    #[error("two goals share ({x}, {y})")]
    DuplicateGoal { x: i32, y: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeDef {
    pub x: i32,
    pub y: i32,
    pub orientation: FaceMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDef {
    pub x: i32,
    pub y: i32,
    pub top: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<StarThresholds>,
    /// Level to offer once this one is solved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_level: Option<String>,
    /// Grid edge length; falls back to the engine config when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<i32>,
    pub cubes: Vec<CubeDef>,
    #[serde(default)]
    pub goals: Vec<GoalDef>,
}

impl LevelDef {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty JSON in the editor's export format
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Grid size for this level, preferring its own `grid` field
    pub fn grid_size(&self, default_size: i32) -> i32 {
        self.grid.unwrap_or(default_size)
    }

    /// Validate and build the initial board
    pub fn to_board(&self, default_size: i32) -> Result<Board, LevelError> {
        let size = self.grid_size(default_size);
        if size < 1 {
            return Err(LevelError::InvalidGrid(size));
        }
        if self.cubes.is_empty() {
            return Err(LevelError::NoCubes);
        }
        let inside = |x: i32, y: i32| x >= 0 && x < size && y >= 0 && y < size;

        let mut cells = HashSet::new();
        let mut cubes = Vec::with_capacity(self.cubes.len());
        for (index, c) in self.cubes.iter().enumerate() {
            if !inside(c.x, c.y) {
                return Err(LevelError::CubeOutOfBounds { index, x: c.x, y: c.y });
            }
            if !cells.insert((c.x, c.y)) {
                return Err(LevelError::DuplicateCube { x: c.x, y: c.y });
            }
            cubes.push(Cube::new(IVec2::new(c.x, c.y), c.orientation.clone()));
        }

        cells.clear();
        let mut goals = Vec::with_capacity(self.goals.len());
        for (index, g) in self.goals.iter().enumerate() {
            if !inside(g.x, g.y) {
                return Err(LevelError::GoalOutOfBounds { index, x: g.x, y: g.y });
            }
            if !cells.insert((g.x, g.y)) {
                return Err(LevelError::DuplicateGoal { x: g.x, y: g.y });
            }
            goals.push(Goal::new(IVec2::new(g.x, g.y), g.top.clone()));
        }

        Ok(Board::new(size, cubes, goals))
    }
}
