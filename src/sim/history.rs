//! Move history
//!
//! An ordered list of `(cube index, direction)` records that rebuilds the
//! current board from the level definition. Rolling a cube straight back the
//! way it just came pops the previous record instead of appending a new one.

use serde::{Deserialize, Serialize};

use super::orientation::Direction;
use super::state::Board;

/// One committed roll. Serialised as `[cubeIndex, "direction"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, Direction)", into = "(usize, Direction)")]
pub struct MoveRecord {
    pub cube_index: usize,
    pub direction: Direction,
}

impl MoveRecord {
    pub fn new(cube_index: usize, direction: Direction) -> Self {
        Self {
            cube_index,
            direction,
        }
    }

    /// The roll that takes this one back
    pub fn inverse(self) -> Self {
        Self::new(self.cube_index, self.direction.opposite())
    }
}

impl From<(usize, Direction)> for MoveRecord {
    fn from((cube_index, direction): (usize, Direction)) -> Self {
        Self::new(cube_index, direction)
    }
}

impl From<MoveRecord> for (usize, Direction) {
    fn from(record: MoveRecord) -> Self {
        (record.cube_index, record.direction)
    }
}

/// What `History::record` did with a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Appended,
    /// The move reversed the previous record, which was popped
    Cancelled(MoveRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSuchCube,
    OutOfBounds,
}

/// A persisted record that replay could not apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position in the sequence handed to replay
    pub index: usize,
    pub record: MoveRecord,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ReplayReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    moves: Vec<MoveRecord>,
}

impl History {
    pub fn new() -> Self {
        Self { moves: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    /// Record a settled player roll, collapsing an immediate reversal
    pub fn record(&mut self, cube_index: usize, direction: Direction) -> RecordOutcome {
        let record = MoveRecord::new(cube_index, direction);
        if let Some(&last) = self.moves.last() {
            if last.inverse() == record {
                self.moves.pop();
                return RecordOutcome::Cancelled(last);
            }
        }
        self.moves.push(record);
        RecordOutcome::Appended
    }

    /// Pop the most recent record so the caller can roll it back
    pub fn undo(&mut self) -> Option<MoveRecord> {
        self.moves.pop()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Records in chronological order
    pub fn serialize(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn restore(&mut self, moves: Vec<MoveRecord>) {
        self.moves = moves;
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.moves)
    }

    /// Parse a persisted history, keeping whatever entries are well formed.
    ///
    /// Returns the parsed history and the number of entries thrown away, or
    /// an error when the text is not a JSON array at all.
    pub fn from_json_lenient(json: &str) -> serde_json::Result<(Self, usize)> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let total = values.len();
        let moves: Vec<MoveRecord> = values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        let dropped = total - moves.len();
        if dropped > 0 {
            log::warn!("Dropped {dropped} malformed move history entries");
        }
        Ok((Self { moves }, dropped))
    }

    /// Apply every record straight onto `board`, bypassing animation.
    ///
    /// Occupancy is not re-checked; records naming a missing cube or rolling
    /// off the grid are skipped and removed from this history.
    pub fn replay(&mut self, board: &mut Board) -> ReplayReport {
        let mut report = ReplayReport::default();
        let mut kept = Vec::with_capacity(self.moves.len());

        for (index, record) in self.moves.iter().copied().enumerate() {
            let reason = match board.cube(record.cube_index) {
                None => Some(SkipReason::NoSuchCube),
                Some(cube) if !board.is_inside(cube.pos + record.direction.delta()) => {
                    Some(SkipReason::OutOfBounds)
                }
                Some(_) => None,
            };
            if let Some(reason) = reason {
                log::warn!("Skipping replay of move #{index} {record:?}: {reason:?}");
                report.skipped.push(SkippedRecord {
                    index,
                    record,
                    reason,
                });
                continue;
            }
            if let Some(cube) = board.cube_mut(record.cube_index) {
                cube.apply_roll(record.direction);
            }
            kept.push(record);
            report.applied += 1;
        }

        self.moves = kept;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::orientation::FaceMap;
    use crate::sim::state::Cube;
    use crate::sim::tick::{MoveEngine, MoveKind, MoveResult, TickOutcome};
    use glam::IVec2;
    use proptest::prelude::*;

    fn faces() -> FaceMap {
        FaceMap::new(
            "yellow".into(),
            "red".into(),
            "green".into(),
            "blue".into(),
            "orange".into(),
            "white".into(),
        )
    }

    fn board() -> Board {
        Board::new(
            5,
            vec![
                Cube::new(IVec2::new(0, 0), faces()),
                Cube::new(IVec2::new(4, 4), faces()),
            ],
            vec![],
        )
    }

    #[test]
    fn test_immediate_reversal_cancels() {
        let mut history = History::new();
        assert_eq!(history.record(0, Direction::East), RecordOutcome::Appended);
        let len = history.len();
        assert_eq!(history.record(0, Direction::North), RecordOutcome::Appended);
        assert_eq!(
            history.record(0, Direction::South),
            RecordOutcome::Cancelled(MoveRecord::new(0, Direction::North))
        );
        assert_eq!(history.len(), len);
    }

    #[test]
    fn test_reversal_on_other_cube_appends() {
        let mut history = History::new();
        history.record(0, Direction::East);
        assert_eq!(history.record(1, Direction::West), RecordOutcome::Appended);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_non_adjacent_reversal_appends() {
        let mut history = History::new();
        history.record(0, Direction::East);
        history.record(1, Direction::North);
        assert_eq!(history.record(0, Direction::West), RecordOutcome::Appended);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_undo_pops_last() {
        let mut history = History::new();
        assert_eq!(history.undo(), None);
        history.record(0, Direction::East);
        history.record(1, Direction::North);
        assert_eq!(history.undo(), Some(MoveRecord::new(1, Direction::North)));
        assert_eq!(history.serialize(), &[MoveRecord::new(0, Direction::East)]);
    }

    #[test]
    fn test_json_format() {
        let mut history = History::new();
        history.record(0, Direction::East);
        history.record(1, Direction::South);
        assert_eq!(history.to_json().unwrap(), r#"[[0,"east"],[1,"south"]]"#);
    }

    #[test]
    fn test_lenient_parse_skips_bad_entries() {
        let (history, dropped) =
            History::from_json_lenient(r#"[[0,"east"],[1,"up"],"junk",[2,"north"]]"#).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(
            history.serialize(),
            &[
                MoveRecord::new(0, Direction::East),
                MoveRecord::new(2, Direction::North)
            ]
        );

        assert!(History::from_json_lenient("not json").is_err());
        assert!(History::from_json_lenient(r#"{"moves":[]}"#).is_err());
    }

    #[test]
    fn test_replay_skips_corrupt_records() {
        let mut b = board();
        let mut history = History::new();
        history.restore(vec![
            MoveRecord::new(0, Direction::East),
            MoveRecord::new(9, Direction::East),
            MoveRecord::new(1, Direction::South),
            MoveRecord::new(0, Direction::South),
        ]);

        let report = history.replay(&mut b);
        assert_eq!(report.applied, 2);
        assert_eq!(
            report.skipped.iter().map(|s| (s.index, s.reason)).collect::<Vec<_>>(),
            vec![(1, SkipReason::NoSuchCube), (2, SkipReason::OutOfBounds)]
        );
        assert_eq!(b.cubes()[0].pos, IVec2::new(1, 1));
        assert_eq!(b.cubes()[1].pos, IVec2::new(4, 4));
        assert_eq!(history.len(), 2);
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::North),
            Just(Direction::South),
            Just(Direction::East),
            Just(Direction::West),
        ]
    }

    proptest! {
        #[test]
        fn prop_replay_matches_live_play(inputs in prop::collection::vec((0usize..2, direction()), 0..40)) {
            let mut engine = MoveEngine::new(board());
            let mut history = History::new();
            for (cube, dir) in inputs {
                if let MoveResult::Accepted(_) = engine.request_move(cube, dir, MoveKind::Player, 0.0) {
                    if let TickOutcome::Committed(c) = engine.tick(1.0) {
                        history.record(c.cube_index, c.direction);
                    }
                }
            }

            let json = history.to_json().unwrap();
            let (mut restored, dropped) = History::from_json_lenient(&json).unwrap();
            prop_assert_eq!(dropped, 0);
            let mut fresh = board();
            let report = restored.replay(&mut fresh);
            prop_assert!(report.is_clean());
            prop_assert_eq!(&fresh, engine.board());
        }
    }
}
