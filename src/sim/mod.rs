//! Deterministic puzzle simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Board changes only through committed rolls
//! - Animation progress is supplied by the host, never read from a clock
//! - Replaying a move history always rebuilds the same board
//! - No rendering, storage or platform dependencies

pub mod goals;
pub mod history;
pub mod orientation;
pub mod state;
pub mod tick;

pub use goals::is_satisfied;
pub use history::{History, MoveRecord, RecordOutcome, ReplayReport, SkipReason, SkippedRecord};
pub use orientation::{Color, Direction, FaceMap, roll};
pub use state::{Board, Cube, Goal};
pub use tick::{
    AnimationDescriptor, Committed, EnginePhase, MoveEngine, MoveKind, MoveResult, Rejection,
    TickOutcome,
};
