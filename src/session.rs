//! Level session
//!
//! Ties one level together: builds the board from the definition, replays the
//! persisted history onto it, routes host input into the move engine, and on
//! every settled roll persists the history and re-checks the goals.

use crate::completion::CompletionRecord;
use crate::config::EngineConfig;
use crate::level::{LevelDef, LevelError};
use crate::persistence::{KeyValueStore, move_history_key};
use crate::platform;
use crate::sim::{
    AnimationDescriptor, Board, Committed, Direction, History, MoveEngine, MoveKind, MoveResult,
    RecordOutcome, TickOutcome, is_satisfied,
};

/// Health of the loaded session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Ready,
    /// Some persisted history could not be used and was discarded
    Degraded { skipped: usize },
}

/// What happened when a roll settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub committed: Committed,
    /// How the history took a player roll; `None` for undo rolls
    pub record: Option<RecordOutcome>,
    pub satisfied: bool,
    /// Goals went from unsatisfied to satisfied on this roll
    pub newly_solved: bool,
    /// A new best completion was written
    pub best_recorded: bool,
}

pub struct LevelSession<S: KeyValueStore> {
    name: String,
    level: LevelDef,
    config: EngineConfig,
    initial: Board,
    engine: MoveEngine,
    history: History,
    store: S,
    status: SessionStatus,
    satisfied: bool,
}

impl<S: KeyValueStore> LevelSession<S> {
    /// Parse `json` and start a session for the level stored as `name`.
    ///
    /// With `reset` set, any persisted history is cleared before replay.
    pub fn load(
        name: impl Into<String>,
        json: &str,
        store: S,
        config: EngineConfig,
        reset: bool,
    ) -> Result<Self, LevelError> {
        Self::from_level(name, LevelDef::from_json(json)?, store, config, reset)
    }

    pub fn from_level(
        name: impl Into<String>,
        level: LevelDef,
        mut store: S,
        config: EngineConfig,
        reset: bool,
    ) -> Result<Self, LevelError> {
        let name = name.into();
        let initial = level.to_board(config.grid_size)?;

        let stored = if reset {
            if let Err(e) = store.remove(&move_history_key(&name)) {
                log::warn!("Failed to clear move history for {name}: {e}");
            }
            StoredHistory::default()
        } else {
            load_history(&store, &name)
        };

        let mut history = stored.history;
        let mut board = initial.clone();
        let report = history.replay(&mut board);
        let skipped = stored.dropped + report.skipped.len();
        let degraded = stored.unreadable || skipped > 0;
        let status = if degraded {
            log::warn!("Discarded {skipped} stored moves for {name}");
            SessionStatus::Degraded { skipped }
        } else {
            SessionStatus::Ready
        };

        let satisfied = is_satisfied(&board);
        let engine = MoveEngine::with_commit_progress(board, config.commit_progress);
        let mut session = Self {
            name,
            level,
            config,
            initial,
            engine,
            history,
            store,
            status,
            satisfied,
        };
        if degraded {
            session.persist_history();
        }
        log::info!(
            "Loaded level {} ({} cubes, {} goals, {} moves replayed)",
            session.name,
            session.initial.cubes().len(),
            session.initial.goals().len(),
            report.applied
        );
        Ok(session)
    }

    /// Storage identity of the level
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name to show in the HUD
    pub fn display_name(&self) -> &str {
        self.level.name.as_deref().unwrap_or(&self.name)
    }

    pub fn level(&self) -> &LevelDef {
        &self.level
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    pub fn animation(&self) -> Option<&AnimationDescriptor> {
        self.engine.animation()
    }

    pub fn is_idle(&self) -> bool {
        self.engine.is_idle()
    }

    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stars the current move count would earn, if the level defines thresholds
    pub fn star_rating(&self) -> Option<u8> {
        self.level.stars.map(|s| s.rating(self.move_count()))
    }

    pub fn best_completion(&self) -> Option<CompletionRecord> {
        CompletionRecord::load(&self.store, &self.name)
    }

    /// Ask to roll a cube; the start time comes from the platform clock
    pub fn request_move(&mut self, cube_index: usize, direction: Direction) -> MoveResult {
        self.request_move_at(cube_index, direction, platform::now_ms())
    }

    pub fn request_move_at(
        &mut self,
        cube_index: usize,
        direction: Direction,
        start_time: f64,
    ) -> MoveResult {
        self.engine
            .request_move(cube_index, direction, MoveKind::Player, start_time)
    }

    /// Start rolling back the last recorded move.
    ///
    /// The record is popped when the roll settles, so board and history agree
    /// at every instant. Returns `None` while busy or with nothing to undo.
    pub fn undo(&mut self) -> Option<AnimationDescriptor> {
        self.undo_at(platform::now_ms())
    }

    pub fn undo_at(&mut self, start_time: f64) -> Option<AnimationDescriptor> {
        if !self.engine.is_idle() {
            return None;
        }
        let inverse = self.history.last()?.inverse();
        match self
            .engine
            .request_move(inverse.cube_index, inverse.direction, MoveKind::Undo, start_time)
        {
            MoveResult::Accepted(anim) => Some(anim),
            MoveResult::Rejected(reason) => {
                log::warn!("Undo blocked in {}: {reason:?}", self.name);
                None
            }
        }
    }

    /// Advance the in-flight roll to host time `now_ms`.
    ///
    /// `now_ms` must come from the clock that supplied the roll's start time.
    pub fn advance_to(&mut self, now_ms: f64) -> Option<Settled> {
        let duration = self.config.animation_ms;
        let progress = self.animation()?.progress_at(now_ms, duration);
        self.tick(progress)
    }

    /// Feed animation progress from the host; returns the settle event on commit
    pub fn tick(&mut self, progress: f32) -> Option<Settled> {
        let TickOutcome::Committed(committed) = self.engine.tick(progress) else {
            return None;
        };

        let record = match committed.kind {
            MoveKind::Player => Some(
                self.history
                    .record(committed.cube_index, committed.direction),
            ),
            MoveKind::Undo => {
                self.history.undo();
                None
            }
        };
        self.persist_history();

        // Rolling straight back counts as an undo for completion purposes
        let was_undo = matches!(committed.kind, MoveKind::Undo)
            || matches!(record, Some(RecordOutcome::Cancelled(_)));

        let satisfied = is_satisfied(self.engine.board());
        let newly_solved = satisfied && !self.satisfied;
        self.satisfied = satisfied;

        let best_recorded = newly_solved
            && !was_undo
            && CompletionRecord::record_if_better(
                &mut self.store,
                &self.name,
                self.history.serialize(),
                platform::now_ms() as u64,
            );

        Some(Settled {
            committed,
            record,
            satisfied,
            newly_solved,
            best_recorded,
        })
    }

    /// Forget the history and put every cube back where the level starts it
    pub fn reset(&mut self) {
        if let Err(e) = self.store.remove(&move_history_key(&self.name)) {
            log::warn!("Failed to clear move history for {}: {e}", self.name);
        }
        self.history.clear();
        self.engine =
            MoveEngine::with_commit_progress(self.initial.clone(), self.config.commit_progress);
        self.status = SessionStatus::Ready;
        self.satisfied = is_satisfied(&self.initial);
        log::info!("Reset level {}", self.name);
    }

    fn persist_history(&mut self) {
        let key = move_history_key(&self.name);
        let result = match self.history.to_json() {
            Ok(json) => self.store.set(&key, &json),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            log::warn!("Failed to save move history for {}: {e}", self.name);
        }
    }
}

/// Persisted history as found in the store
#[derive(Default)]
struct StoredHistory {
    history: History,
    /// Malformed entries thrown away while parsing
    dropped: usize,
    /// The stored value was not a move list at all
    unreadable: bool,
}

fn load_history<S: KeyValueStore + ?Sized>(store: &S, name: &str) -> StoredHistory {
    let json = match store.get(&move_history_key(name)) {
        Ok(Some(json)) => json,
        Ok(None) => return StoredHistory::default(),
        Err(e) => {
            log::warn!("Failed to read move history for {name}: {e}");
            return StoredHistory::default();
        }
    };
    match History::from_json_lenient(&json) {
        Ok((history, dropped)) => StoredHistory {
            history,
            dropped,
            unreadable: false,
        },
        Err(e) => {
            log::warn!("Stored move history for {name} is unreadable, discarding it: {e}");
            StoredHistory {
                unreadable: true,
                ..Default::default()
            }
        }
    }
}
