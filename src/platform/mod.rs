//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging setup
//! - Visibility/focus detection (auto-pause music)
//! - First user gesture (browsers block audio autoplay)

mod focus;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use focus::{AutoPause, MusicStarter, set_music_enabled, set_pause_music_on_blur};

/// Initialise logging once (console on web, env_logger on native)
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::try_init();
}
