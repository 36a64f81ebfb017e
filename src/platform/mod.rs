//! Platform abstraction layer
//!
//! Browser helpers for the page the minigame is mounted in:
//! - Query string (cheat modes)
//! - Device pixel ratio
//! - DOM text and visibility for the HUD and panels
//!
//! Native builds get inert stubs so the engine and its tests stay headless.

#[cfg(target_arch = "wasm32")]
mod web {
    /// `window.location.search`, including the leading `?`
    pub fn location_search() -> Option<String> {
        web_sys::window()?.location().search().ok()
    }

    pub fn device_pixel_ratio() -> f32 {
        web_sys::window()
            .map(|w| w.device_pixel_ratio() as f32)
            .filter(|dpr| *dpr > 0.0)
            .unwrap_or(1.0)
    }

    /// Milliseconds since the epoch
    pub fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    fn element(id: &str) -> Option<web_sys::Element> {
        web_sys::window()?.document()?.get_element_by_id(id)
    }

    pub fn set_text(id: &str, text: &str) {
        if let Some(el) = element(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Toggle the `hidden` class
    pub fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = element(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::*;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn location_search() -> Option<String> {
        None
    }

    pub fn device_pixel_ratio() -> f32 {
        1.0
    }

    pub fn now_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }

    pub fn set_text(_id: &str, _text: &str) {}

    pub fn set_hidden(_id: &str, _hidden: bool) {}
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;

/// Heart glyphs for the life display, full hearts first
pub fn hearts_text(hearts: &[bool]) -> String {
    hearts.iter().map(|&full| if full { '♥' } else { '♡' }).collect()
}
