//! Browser bindings (WASM only)
//!
//! The page owns the canvas, the render loop and fetching level JSON; it
//! drives a `WebSession` with pointer input and frame timestamps. Every
//! timestamp handed in (move start and frame time) must come from the same
//! clock, typically the `requestAnimationFrame` time.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::config::EngineConfig;
use crate::consts::DRAG_THRESHOLD;
use crate::persistence::{KeyValueStore, LocalStorage, MemoryStore};
use crate::platform::level_name_from_path;
use crate::session::LevelSession;
use crate::sim::Direction;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Cube Roll starting...");
}

fn open_store() -> Box<dyn KeyValueStore> {
    match LocalStorage::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{e}; progress will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

#[wasm_bindgen]
pub struct WebSession {
    session: LevelSession<Box<dyn KeyValueStore>>,
}

#[wasm_bindgen]
impl WebSession {
    /// Start a session for the level named by `path` (the page's URL path)
    #[wasm_bindgen(constructor)]
    pub fn new(level_json: &str, path: &str, reset: bool) -> Result<WebSession, JsValue> {
        let store = open_store();
        let config = EngineConfig::load(&store);
        let name = level_name_from_path(path);
        LevelSession::load(name, level_json, store, config, reset)
            .map(|session| WebSession { session })
            .map_err(|e| {
                log::error!("Failed to load level: {e}");
                JsValue::from_str(&e.to_string())
            })
    }

    #[wasm_bindgen(js_name = levelName)]
    pub fn level_name(&self) -> String {
        self.session.name().to_string()
    }

    #[wasm_bindgen(js_name = displayName)]
    pub fn display_name(&self) -> String {
        self.session.display_name().to_string()
    }

    /// Start a roll at host time `now_ms`; `tick` must be fed the same clock
    #[wasm_bindgen(js_name = requestMove)]
    pub fn request_move(&mut self, cube: usize, direction: &str, now_ms: f64) -> bool {
        match direction.parse::<Direction>() {
            Ok(dir) => self.session.request_move_at(cube, dir, now_ms).is_accepted(),
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    /// Roll the cube under the pointer in the dominant drag direction
    pub fn drag(&mut self, cube: usize, dx: f32, dy: f32, now_ms: f64) -> bool {
        Direction::from_drag(Vec2::new(dx, dy), DRAG_THRESHOLD)
            .is_some_and(|dir| self.session.request_move_at(cube, dir, now_ms).is_accepted())
    }

    /// Advance the in-flight roll to frame time `now_ms`; true when it settled
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.session.advance_to(now_ms).is_some()
    }

    /// Advance the in-flight roll to an explicit progress in [0, 1]
    #[wasm_bindgen(js_name = tickProgress)]
    pub fn tick_progress(&mut self, progress: f32) -> bool {
        self.session.tick(progress).is_some()
    }

    pub fn undo(&mut self, now_ms: f64) -> bool {
        self.session.undo_at(now_ms).is_some()
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    #[wasm_bindgen(js_name = isSatisfied)]
    pub fn is_satisfied(&self) -> bool {
        self.session.is_satisfied()
    }

    #[wasm_bindgen(js_name = moveCount)]
    pub fn move_count(&self) -> usize {
        self.session.move_count()
    }

    /// Stars for the current move count, or -1 when the level has no thresholds
    #[wasm_bindgen(js_name = starRating)]
    pub fn star_rating(&self) -> i32 {
        self.session.star_rating().map_or(-1, i32::from)
    }

    #[wasm_bindgen(js_name = boardJson)]
    pub fn board_json(&self) -> String {
        serde_json::to_string(self.session.board()).unwrap_or_default()
    }

    #[wasm_bindgen(js_name = animationJson)]
    pub fn animation_json(&self) -> Option<String> {
        self.session
            .animation()
            .and_then(|anim| serde_json::to_string(anim).ok())
    }
}
