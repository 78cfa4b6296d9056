//! Board state and core simulation types
//!
//! Cubes are addressed by their index in `Board::cubes`. Cubes are never
//! reordered or removed during play, so an index stays valid for the whole
//! session and is what the move history stores.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::orientation::{Color, Direction, FaceMap, roll};

/// A cube resting on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cube {
    pub pos: IVec2,
    pub orientation: FaceMap,
}

impl Cube {
    pub fn new(pos: IVec2, orientation: FaceMap) -> Self {
        Self { pos, orientation }
    }

    /// Roll one cell in `direction`, updating position and faces together
    pub(crate) fn apply_roll(&mut self, direction: Direction) {
        self.pos += direction.delta();
        self.orientation = roll(direction, &self.orientation);
    }
}

/// A target cell that wants a cube with a particular colour on top
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub pos: IVec2,
    pub required_top: Color,
}

impl Goal {
    pub fn new(pos: IVec2, required_top: Color) -> Self {
        Self { pos, required_top }
    }
}

/// Complete board for one level (cubes, goals and grid size)
///
/// Invariant: no two cubes share a cell. The move engine enforces it before
/// committing a roll; nothing repairs it after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: i32,
    cubes: Vec<Cube>,
    goals: Vec<Goal>,
}

impl Board {
    /// Build a board from already-validated parts (see `level::LevelDef::to_board`)
    pub(crate) fn new(size: i32, cubes: Vec<Cube>, goals: Vec<Goal>) -> Self {
        Self { size, cubes, goals }
    }

    /// Grid edge length
    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn cube(&self, index: usize) -> Option<&Cube> {
        self.cubes.get(index)
    }

    pub fn cube_at(&self, pos: IVec2) -> Option<&Cube> {
        self.cubes.iter().find(|c| c.pos == pos)
    }

    /// Index of the cube resting on `pos`, if any
    pub fn cube_index_at(&self, pos: IVec2) -> Option<usize> {
        self.cubes.iter().position(|c| c.pos == pos)
    }

    pub fn goal_at(&self, pos: IVec2) -> Option<&Goal> {
        self.goals.iter().find(|g| g.pos == pos)
    }

    pub fn is_inside(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.x < self.size && pos.y >= 0 && pos.y < self.size
    }

    /// True if a cube other than `excluding` rests on `pos`
    pub fn is_occupied(&self, pos: IVec2, excluding: Option<usize>) -> bool {
        self.cubes
            .iter()
            .enumerate()
            .any(|(i, c)| Some(i) != excluding && c.pos == pos)
    }

    pub(crate) fn cube_mut(&mut self, index: usize) -> Option<&mut Cube> {
        self.cubes.get_mut(index)
    }
}
