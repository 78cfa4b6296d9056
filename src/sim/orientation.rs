//! Cube orientation algebra
//!
//! A cube carries one colour per logical face. Rolling the cube over one of
//! its bottom edges permutes those colours; this is the only place face
//! colours are ever rearranged.

use std::fmt;
use std::str::FromStr;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Opaque colour token (palette name such as `"yellow"`)
///
/// The simulation only compares colours; resolving a name to RGB is the
/// renderer's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the four legal rolls
///
/// Grid y grows southwards, so `North` moves toward y - 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Grid offset of one roll in this direction
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::North => IVec2::new(0, -1),
            Direction::South => IVec2::new(0, 1),
            Direction::East => IVec2::new(1, 0),
            Direction::West => IVec2::new(-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }

    /// Map a pointer drag (screen space, y down) to the dominant-axis direction.
    ///
    /// Returns `None` when the drag is shorter than `threshold`.
    pub fn from_drag(delta: Vec2, threshold: f32) -> Option<Self> {
        if delta.length() < threshold {
            return None;
        }
        let dir = if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if delta.y > 0.0 {
            Direction::South
        } else {
            Direction::North
        };
        Some(dir)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "north" | "n" => Ok(Direction::North),
            "south" | "s" => Ok(Direction::South),
            "east" | "e" => Ok(Direction::East),
            "west" | "w" => Ok(Direction::West),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

/// Colour assignment for the six faces of a cube
///
/// Fields are read-only outside this module so that every orientation the
/// engine holds is reachable from a level's initial one through [`roll`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceMap {
    top: Color,
    bottom: Color,
    north: Color,
    south: Color,
    east: Color,
    west: Color,
}

impl FaceMap {
    pub fn new(
        top: Color,
        bottom: Color,
        north: Color,
        south: Color,
        east: Color,
        west: Color,
    ) -> Self {
        Self {
            top,
            bottom,
            north,
            south,
            east,
            west,
        }
    }

    pub fn top(&self) -> &Color {
        &self.top
    }

    pub fn bottom(&self) -> &Color {
        &self.bottom
    }

    pub fn north(&self) -> &Color {
        &self.north
    }

    pub fn south(&self) -> &Color {
        &self.south
    }

    pub fn east(&self) -> &Color {
        &self.east
    }

    pub fn west(&self) -> &Color {
        &self.west
    }
}

/// Rotate `o` by a quarter turn over the edge facing `direction`.
pub fn roll(direction: Direction, o: &FaceMap) -> FaceMap {
    let o = o.clone();
    match direction {
        Direction::North => FaceMap {
            top: o.south,
            bottom: o.north,
            north: o.top,
            south: o.bottom,
            east: o.east,
            west: o.west,
        },
        Direction::South => FaceMap {
            top: o.north,
            bottom: o.south,
            north: o.bottom,
            south: o.top,
            east: o.east,
            west: o.west,
        },
        Direction::East => FaceMap {
            top: o.west,
            bottom: o.east,
            north: o.north,
            south: o.south,
            east: o.top,
            west: o.bottom,
        },
        Direction::West => FaceMap {
            top: o.east,
            bottom: o.west,
            north: o.north,
            south: o.south,
            east: o.bottom,
            west: o.top,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn labelled() -> FaceMap {
        FaceMap::new(
            "top".into(),
            "bottom".into(),
            "north".into(),
            "south".into(),
            "east".into(),
            "west".into(),
        )
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::North),
            Just(Direction::South),
            Just(Direction::East),
            Just(Direction::West),
        ]
    }

    #[test]
    fn test_roll_north_permutation() {
        let o = roll(Direction::North, &labelled());
        assert_eq!(o.top().as_str(), "south");
        assert_eq!(o.north().as_str(), "top");
        assert_eq!(o.bottom().as_str(), "north");
        assert_eq!(o.south().as_str(), "bottom");
        assert_eq!(o.east().as_str(), "east");
        assert_eq!(o.west().as_str(), "west");
    }

    #[test]
    fn test_roll_east_permutation() {
        let o = roll(Direction::East, &labelled());
        assert_eq!(o.top().as_str(), "west");
        assert_eq!(o.east().as_str(), "top");
        assert_eq!(o.bottom().as_str(), "east");
        assert_eq!(o.west().as_str(), "bottom");
        assert_eq!(o.north().as_str(), "north");
        assert_eq!(o.south().as_str(), "south");
    }

    #[test]
    fn test_each_roll_has_order_four() {
        for dir in Direction::ALL {
            let start = labelled();
            let mut o = start.clone();
            for step in 1..=4 {
                o = roll(dir, &o);
                assert_eq!(o == start, step == 4, "{dir} after {step} rolls");
            }
        }
    }

    #[test]
    fn test_reachable_orientations_number_24() {
        let mut seen = std::collections::HashSet::new();
        let mut frontier = vec![labelled()];
        while let Some(o) = frontier.pop() {
            if seen.insert(o.clone()) {
                for dir in Direction::ALL {
                    frontier.push(roll(dir, &o));
                }
            }
        }
        assert_eq!(seen.len(), 24);
    }

    #[test]
    fn test_single_square_loop_is_not_identity() {
        let mut o = labelled();
        for d in [Direction::North, Direction::East, Direction::South, Direction::West] {
            o = roll(d, &o);
        }
        assert_ne!(o, labelled());
        assert_eq!(o.top().as_str(), "south");
    }

    #[test]
    fn test_delta_and_opposite() {
        for dir in Direction::ALL {
            assert_eq!(dir.delta() + dir.opposite().delta(), IVec2::ZERO);
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert_eq!(Direction::North.delta(), IVec2::new(0, -1));
    }

    #[test]
    fn test_from_drag() {
        assert_eq!(Direction::from_drag(Vec2::new(5.0, 2.0), 20.0), None);
        assert_eq!(
            Direction::from_drag(Vec2::new(30.0, 10.0), 20.0),
            Some(Direction::East)
        );
        assert_eq!(
            Direction::from_drag(Vec2::new(-30.0, 10.0), 20.0),
            Some(Direction::West)
        );
        assert_eq!(
            Direction::from_drag(Vec2::new(3.0, -25.0), 20.0),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::from_drag(Vec2::new(3.0, 25.0), 20.0),
            Some(Direction::South)
        );
    }

    #[test]
    fn test_direction_serde_lowercase() {
        let json = serde_json::to_string(&Direction::West).unwrap();
        assert_eq!(json, "\"west\"");
        let dir: Direction = serde_json::from_str("\"north\"").unwrap();
        assert_eq!(dir, Direction::North);
        assert_eq!("E".parse::<Direction>(), Ok(Direction::East));
        assert!("up".parse::<Direction>().is_err());
    }

    proptest! {
        #[test]
        fn prop_opposite_roll_is_inverse(path in prop::collection::vec(direction(), 0..12), dir in direction()) {
            let mut o = labelled();
            for d in path {
                o = roll(d, &o);
            }
            let back = roll(dir.opposite(), &roll(dir, &o));
            prop_assert_eq!(back, o);
        }

        #[test]
        fn prop_north_east_south_west_cycle_closes(path in prop::collection::vec(direction(), 0..12)) {
            let mut o = labelled();
            for d in path {
                o = roll(d, &o);
            }
            // One N,E,S,W loop turns the cube about a body diagonal; three loops close it.
            let mut cycled = o.clone();
            for _ in 0..3 {
                for d in [Direction::North, Direction::East, Direction::South, Direction::West] {
                    cycled = roll(d, &cycled);
                }
            }
            prop_assert_eq!(cycled, o);
        }
    }
}
