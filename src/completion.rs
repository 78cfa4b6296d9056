//! Best-completion records
//!
//! Persisted per level under `completed_<level>`; only a solution with
//! strictly fewer moves replaces the stored one.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, completion_key};
use crate::sim::MoveRecord;

/// Move-count thresholds for one, two and three stars; any may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three: Option<u32>,
}

impl StarThresholds {
    /// Stars earned by a solution of `moves` moves (0-3). Missing tiers are never awarded.
    pub fn rating(&self, moves: usize) -> u8 {
        let moves = moves as u64;
        let within = |limit: Option<u32>| limit.is_some_and(|l| moves <= u64::from(l));
        if within(self.three) {
            3
        } else if within(self.two) {
            2
        } else if within(self.one) {
            1
        } else {
            0
        }
    }
}

/// A solved level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    /// Unix timestamp (ms) when achieved
    pub completed_at: u64,
    pub move_history: Vec<MoveRecord>,
}

impl CompletionRecord {
    pub fn new(completed_at: u64, move_history: Vec<MoveRecord>) -> Self {
        Self {
            completed_at,
            move_history,
        }
    }

    pub fn move_count(&self) -> usize {
        self.move_history.len()
    }

    /// Check if a solution of `moves` moves would replace this record
    pub fn improved_by(&self, moves: usize) -> bool {
        moves < self.move_count()
    }

    /// Load the stored record for `level`; unreadable data counts as none
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, level: &str) -> Option<Self> {
        let json = match store.get(&completion_key(level)) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read completion for {level}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Ignoring unreadable completion for {level}: {e}");
                None
            }
        }
    }

    /// Store `moves` as the level's best if it beats (or there is no) previous record.
    ///
    /// Returns true when a record was written.
    pub fn record_if_better<S: KeyValueStore + ?Sized>(
        store: &mut S,
        level: &str,
        moves: &[MoveRecord],
        completed_at: u64,
    ) -> bool {
        if let Some(prev) = Self::load(store, level) {
            if !prev.improved_by(moves.len()) {
                log::info!(
                    "Solved {level} in {} moves (best stays {})",
                    moves.len(),
                    prev.move_count()
                );
                return false;
            }
        }

        let record = Self::new(completed_at, moves.to_vec());
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to encode completion for {level}: {e}");
                return false;
            }
        };
        match store.set(&completion_key(level), &json) {
            Ok(()) => {
                log::info!("New best for {level}: {} moves", moves.len());
                true
            }
            Err(e) => {
                log::warn!("Failed to record completion for {level}: {e}");
                false
            }
        }
    }
}
