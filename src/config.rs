//! Engine configuration
//!
//! Persisted in the key-value store next to the move histories.

use serde::{Deserialize, Serialize};

use crate::consts::{ANIM_MS, COMMIT_PROGRESS, GRID};
use crate::persistence::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default grid edge length for levels without their own `grid`
    pub grid_size: i32,
    /// Tick progress at which a roll commits to the board (0, 1]
    pub commit_progress: f32,
    /// Suggested roll animation length for hosts
    pub animation_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID,
            commit_progress: COMMIT_PROGRESS,
            animation_ms: ANIM_MS,
        }
    }
}

impl EngineConfig {
    /// Store key
    const STORAGE_KEY: &'static str = "cube_roll_config";

    /// Load config from the store, falling back to defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        if let Ok(Some(json)) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("Loaded engine config");
                    return config;
                }
                Err(e) => log::warn!("Ignoring unreadable engine config: {e}"),
            }
        }

        log::info!("Using default engine config");
        Self::default()
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Engine config saved"),
                Err(e) => log::warn!("Failed to save engine config: {e}"),
            },
            Err(e) => log::warn!("Failed to encode engine config: {e}"),
        }
    }
}
