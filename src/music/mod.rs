//! Background music
//!
//! A fixed playlist loops forever: when a track ends the next one starts on
//! its own, wrapping back to the first track after the last. Only the
//! selected track is ever played or paused.

mod playlist;
mod sequencer;
#[cfg(not(target_arch = "wasm32"))]
pub mod silent;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use playlist::{Playlist, next_track_index};
pub use sequencer::Sequencer;

#[cfg(not(target_arch = "wasm32"))]
pub use silent::{Music, SilentTrack};
#[cfg(target_arch = "wasm32")]
pub use web::{HtmlTrack, Music};

/// A playable audio resource with an "ended" notification
///
/// Tracks are handles: methods take `&self` and implementations use
/// interior mutability, the same way browser media elements behave.
pub trait Track {
    /// Start or resume playback. Calling it while already playing is left
    /// to the backend (no-op or restart).
    fn play(&self);

    /// Pause playback. No-op when not playing.
    fn pause(&self);

    fn is_playing(&self) -> bool;

    /// Register the handler fired when playback reaches the end of the
    /// track, replacing any previous one.
    fn on_ended(&self, handler: Box<dyn FnMut()>);

    /// Drop the registered ended handler, if any.
    fn clear_on_ended(&self);
}
