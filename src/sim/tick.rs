//! Move engine
//!
//! Validates rolls, hands the host an animation descriptor and commits the
//! roll to the board once the host reports that the animation has (nearly)
//! finished. Board state only changes at commit time, so whatever the host
//! draws mid-animation is the pre-move board plus the descriptor.

use glam::IVec2;
use serde::Serialize;

use super::orientation::{Direction, FaceMap, roll};
use super::state::Board;
use crate::consts::COMMIT_PROGRESS;

/// Why a roll is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// Player input; recorded in the history when it settles
    Player,
    /// Inverse roll driven by undo; never recorded
    Undo,
}

/// Everything a renderer needs to draw a roll in flight
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDescriptor {
    pub cube_index: usize,
    pub direction: Direction,
    pub start_pos: IVec2,
    pub end_pos: IVec2,
    /// Orientation before the roll; the board keeps this until commit
    pub start_orientation: FaceMap,
    /// Host timestamp (ms) when the roll was accepted
    pub start_time: f64,
    pub kind: MoveKind,
}

impl AnimationDescriptor {
    /// Linear progress in [0, 1] at `now_ms` for an animation lasting `duration_ms`
    pub fn progress_at(&self, now_ms: f64, duration_ms: f64) -> f32 {
        if duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_time) / duration_ms).clamp(0.0, 1.0) as f32
    }
}

/// Engine state machine
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePhase {
    Idle,
    Animating(AnimationDescriptor),
}

/// Reason a roll was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Another roll is still animating
    Busy,
    NoSuchCube,
    OutOfBounds,
    Occupied,
}

/// Answer to `request_move`
#[derive(Debug, Clone, PartialEq)]
pub enum MoveResult {
    Accepted(AnimationDescriptor),
    Rejected(Rejection),
}

impl MoveResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveResult::Accepted(_))
    }
}

/// A roll that has just been applied to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    pub cube_index: usize,
    pub direction: Direction,
    pub kind: MoveKind,
}

/// Result of advancing the animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing in flight
    Idle,
    /// Still animating, board untouched
    Animating,
    Committed(Committed),
}

/// Owns the board and is the only thing that mutates it during play
#[derive(Debug, Clone)]
pub struct MoveEngine {
    board: Board,
    phase: EnginePhase,
    commit_progress: f32,
}

impl MoveEngine {
    pub fn new(board: Board) -> Self {
        Self::with_commit_progress(board, COMMIT_PROGRESS)
    }

    /// Engine that commits once tick progress reaches `commit_progress`
    pub fn with_commit_progress(board: Board, commit_progress: f32) -> Self {
        let commit_progress = if commit_progress > 0.0 {
            commit_progress.min(1.0)
        } else {
            COMMIT_PROGRESS
        };
        Self {
            board,
            phase: EnginePhase::Idle,
            commit_progress,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> &EnginePhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, EnginePhase::Idle)
    }

    pub fn animation(&self) -> Option<&AnimationDescriptor> {
        match &self.phase {
            EnginePhase::Animating(anim) => Some(anim),
            EnginePhase::Idle => None,
        }
    }

    /// Destination cell of a legal roll, or why the roll is refused
    pub fn check_move(&self, cube_index: usize, direction: Direction) -> Result<IVec2, Rejection> {
        if !self.is_idle() {
            return Err(Rejection::Busy);
        }
        let cube = self.board.cube(cube_index).ok_or(Rejection::NoSuchCube)?;
        let target = cube.pos + direction.delta();
        if !self.board.is_inside(target) {
            return Err(Rejection::OutOfBounds);
        }
        if self.board.is_occupied(target, Some(cube_index)) {
            return Err(Rejection::Occupied);
        }
        Ok(target)
    }

    /// Start a roll. On acceptance the engine is Animating until `tick` commits it.
    pub fn request_move(
        &mut self,
        cube_index: usize,
        direction: Direction,
        kind: MoveKind,
        start_time: f64,
    ) -> MoveResult {
        let end_pos = match self.check_move(cube_index, direction) {
            Ok(pos) => pos,
            Err(reason) => {
                log::debug!("Rejected {cube_index} {direction}: {reason:?}");
                return MoveResult::Rejected(reason);
            }
        };
        let Some(cube) = self.board.cube(cube_index) else {
            return MoveResult::Rejected(Rejection::NoSuchCube);
        };

        let anim = AnimationDescriptor {
            cube_index,
            direction,
            start_pos: cube.pos,
            end_pos,
            start_orientation: cube.orientation.clone(),
            start_time,
            kind,
        };
        self.phase = EnginePhase::Animating(anim.clone());
        MoveResult::Accepted(anim)
    }

    /// Advance the in-flight roll to `progress` (0..=1), committing at the threshold
    pub fn tick(&mut self, progress: f32) -> TickOutcome {
        let EnginePhase::Animating(anim) = &self.phase else {
            return TickOutcome::Idle;
        };
        if progress.is_nan() || progress < self.commit_progress {
            return TickOutcome::Animating;
        }

        let committed = Committed {
            cube_index: anim.cube_index,
            direction: anim.direction,
            kind: anim.kind,
        };
        let orientation = roll(anim.direction, &anim.start_orientation);
        let end_pos = anim.end_pos;
        if let Some(cube) = self.board.cube_mut(anim.cube_index) {
            cube.pos = end_pos;
            cube.orientation = orientation;
        }
        self.phase = EnginePhase::Idle;
        log::debug!(
            "Committed cube {} {} -> {:?}",
            committed.cube_index,
            committed.direction,
            end_pos
        );
        TickOutcome::Committed(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::orientation::Color;
    use crate::sim::state::{Cube, Goal};

    fn faces(top: &str, west: &str) -> FaceMap {
        let w = Color::from("white");
        FaceMap::new(top.into(), w.clone(), w.clone(), w.clone(), w, west.into())
    }

    fn engine() -> MoveEngine {
        MoveEngine::new(Board::new(
            5,
            vec![
                Cube::new(IVec2::new(0, 0), faces("yellow", "white")),
                Cube::new(IVec2::new(0, 1), faces("red", "white")),
            ],
            vec![Goal::new(IVec2::new(1, 0), "yellow".into())],
        ))
    }

    #[test]
    fn test_tick_idle_to_animating_to_idle() {
        let mut engine = engine();
        assert_eq!(engine.tick(1.0), TickOutcome::Idle);

        let result = engine.request_move(0, Direction::East, MoveKind::Player, 10.0);
        let MoveResult::Accepted(anim) = result else {
            panic!("move should be accepted");
        };
        assert_eq!(anim.start_pos, IVec2::new(0, 0));
        assert_eq!(anim.end_pos, IVec2::new(1, 0));
        assert_eq!(anim.start_time, 10.0);
        assert!(!engine.is_idle());

        // Board is untouched until commit
        assert_eq!(engine.tick(0.5), TickOutcome::Animating);
        assert_eq!(engine.board().cubes()[0].pos, IVec2::new(0, 0));
        assert_eq!(engine.board().cubes()[0].orientation.top().as_str(), "yellow");

        let outcome = engine.tick(1.0);
        assert_eq!(
            outcome,
            TickOutcome::Committed(Committed {
                cube_index: 0,
                direction: Direction::East,
                kind: MoveKind::Player,
            })
        );
        assert!(engine.is_idle());
        let cube = &engine.board().cubes()[0];
        assert_eq!(cube.pos, IVec2::new(1, 0));
        assert_eq!(cube.orientation.top().as_str(), "white");
        assert_eq!(cube.orientation.east().as_str(), "yellow");
    }

    #[test]
    fn test_commit_threshold() {
        let mut engine = engine();
        assert!(engine.request_move(0, Direction::East, MoveKind::Player, 0.0).is_accepted());
        assert_eq!(engine.tick(0.94), TickOutcome::Animating);
        assert!(matches!(engine.tick(0.95), TickOutcome::Committed(_)));
    }

    #[test]
    fn test_rejections_leave_board_untouched() {
        let mut engine = engine();
        let before = engine.board().clone();

        assert_eq!(
            engine.request_move(0, Direction::North, MoveKind::Player, 0.0),
            MoveResult::Rejected(Rejection::OutOfBounds)
        );
        assert_eq!(
            engine.request_move(0, Direction::West, MoveKind::Player, 0.0),
            MoveResult::Rejected(Rejection::OutOfBounds)
        );
        assert_eq!(
            engine.request_move(0, Direction::South, MoveKind::Player, 0.0),
            MoveResult::Rejected(Rejection::Occupied)
        );
        assert_eq!(
            engine.request_move(7, Direction::South, MoveKind::Player, 0.0),
            MoveResult::Rejected(Rejection::NoSuchCube)
        );
        assert!(engine.is_idle());
        assert_eq!(engine.board(), &before);
    }

    #[test]
    fn test_busy_while_animating() {
        let mut engine = engine();
        assert!(engine.request_move(0, Direction::East, MoveKind::Player, 0.0).is_accepted());
        assert_eq!(
            engine.request_move(1, Direction::East, MoveKind::Player, 0.0),
            MoveResult::Rejected(Rejection::Busy)
        );
        assert_eq!(engine.animation().map(|a| a.cube_index), Some(0));
    }

    #[test]
    fn test_nan_progress_does_not_commit() {
        let mut engine = engine();
        assert!(engine.request_move(0, Direction::East, MoveKind::Undo, 0.0).is_accepted());
        assert_eq!(engine.tick(f32::NAN), TickOutcome::Animating);
    }

    #[test]
    fn test_progress_at() {
        let mut engine = engine();
        let MoveResult::Accepted(anim) =
            engine.request_move(0, Direction::East, MoveKind::Player, 1000.0)
        else {
            panic!("move should be accepted");
        };
        assert_eq!(anim.progress_at(900.0, 250.0), 0.0);
        assert!((anim.progress_at(1125.0, 250.0) - 0.5).abs() < 1e-6);
        assert_eq!(anim.progress_at(2000.0, 250.0), 1.0);
        assert_eq!(anim.progress_at(1000.0, 0.0), 1.0);
    }

    #[test]
    fn test_invalid_commit_progress_falls_back() {
        let engine = MoveEngine::with_commit_progress(engine().board().clone(), -1.0);
        assert_eq!(engine.commit_progress, COMMIT_PROGRESS);
        let engine = MoveEngine::with_commit_progress(engine.board().clone(), 3.0);
        assert_eq!(engine.commit_progress, 1.0);
    }
}
