//! Cube Roll - a grid puzzle of rolling coloured cubes onto goals
//!
//! Core modules:
//! - `sim`: Deterministic simulation (orientation algebra, board, move engine, history)
//! - `level`: Level definition JSON and validation
//! - `session`: Per-level orchestration of load, replay, play and completion
//! - `persistence`: Key-value storage backends
//! - `platform`: Browser/native platform abstraction

pub mod completion;
pub mod config;
pub mod level;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use completion::{CompletionRecord, StarThresholds};
pub use config::EngineConfig;
pub use level::{LevelDef, LevelError};
pub use session::{LevelSession, SessionStatus, Settled};

/// Game configuration constants
pub mod consts {
    /// Default grid edge length
    pub const GRID: i32 = 5;
    /// Roll animation length (ms)
    pub const ANIM_MS: f64 = 250.0;
    /// Animation progress at which a roll is committed to the board
    pub const COMMIT_PROGRESS: f32 = 0.95;
    /// Level played when none is named
    pub const DEFAULT_LEVEL: &str = "tutorial";
    /// Minimum pointer travel (px) before a drag counts as a roll
    pub const DRAG_THRESHOLD: f32 = 20.0;
}
