//! Apprentice web glue - background music and save-game persistence
//!
//! Core modules:
//! - `music`: Looping background playlist (advance on track end, play/pause)
//! - `persistence`: Single-slot save store mirrored to an async key-value store
//! - `settings`: Player preferences persisted in LocalStorage
//! - `platform`: Logging setup and browser event wiring

pub mod error;
pub mod music;
pub mod persistence;
pub mod platform;
pub mod settings;

pub use error::{MusicError, StoreError};
pub use music::{Music, Sequencer, Track};
pub use persistence::{KeyValueStore, MemoryStore, SaveStore, StoreOp};
pub use settings::Settings;

/// Fixed resource names and storage keys
pub mod consts {
    /// Background tracks in playback order
    pub const MUSIC_TRACKS: [&str; 4] = [
        "resources/dungeon_music_r2.mp3",
        "resources/marching_music.mp3",
        "resources/app_amb1.mp3",
        "resources/apprentice4.mp3",
    ];

    /// Key of the one save slot in the external store
    pub const SAVE_KEY: &str = "apprentice";

    /// LocalStorage key for settings
    pub const SETTINGS_KEY: &str = "apprentice_settings";

    /// Directory holding native save files
    pub const NATIVE_SAVE_DIR: &str = ".";
}
