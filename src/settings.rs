//! Player preferences
//!
//! Persisted separately from game saves in LocalStorage.

use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use crate::consts::SETTINGS_KEY;

/// Music and startup preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Background music on/off
    pub music_enabled: bool,
    /// Pause music while the tab is hidden or the window loses focus
    pub pause_music_on_blur: bool,
    /// Start music on the first key/pointer press (browsers block autoplay)
    pub start_music_on_first_input: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_enabled: true,
            pause_music_on_blur: true,
            start_music_on_first_input: true,
        }
    }
}

impl Settings {
    /// Whether music should start by itself once the player interacts
    pub fn autostart_music(&self) -> bool {
        self.music_enabled && self.start_music_on_first_input
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(SETTINGS_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable - settings not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => match storage.set_item(SETTINGS_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {:?}", e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
