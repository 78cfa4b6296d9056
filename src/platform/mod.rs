//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (completion timestamps, animation start times)
//! - Level selection from the page URL

use crate::consts::DEFAULT_LEVEL;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Resolve the level name from a URL path.
///
/// `/<prefix>/level/<name>` selects `<name>`. A bare path, a lone segment
/// (the site prefix) or an `.html` page selects the tutorial; otherwise the
/// last segment names the level.
pub fn level_name_from_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return DEFAULT_LEVEL.to_string();
    }
    if let Some(idx) = segments.iter().position(|s| *s == "level") {
        return segments
            .get(idx + 1)
            .map_or_else(|| DEFAULT_LEVEL.to_string(), |s| s.to_string());
    }
    if segments.len() == 1 {
        return DEFAULT_LEVEL.to_string();
    }
    match segments.last() {
        Some(last) if !last.ends_with(".html") => last.to_string(),
        _ => DEFAULT_LEVEL.to_string(),
    }
}
