//! Playlist state and the track-advance rule

use super::Track;
use crate::error::MusicError;

/// Index of the track that follows `index` in a looping playlist of `count` tracks
///
/// Always moves forward and wraps to 0 after the last track. `count` must be
/// non-zero; [`Playlist::new`] guarantees that for every playlist.
#[inline]
pub fn next_track_index(index: usize, count: usize) -> usize {
    debug_assert!(count > 0, "next_track_index on an empty playlist");
    (index + 1) % count
}

/// Ordered, fixed track list with a selected index
///
/// Invariant: `selected < tracks.len()` and the list is never empty.
pub struct Playlist<T> {
    tracks: Vec<T>,
    selected: usize,
}

impl<T: Track> Playlist<T> {
    /// Build a playlist with the first track selected
    pub fn new(tracks: Vec<T>) -> Result<Self, MusicError> {
        if tracks.is_empty() {
            return Err(MusicError::EmptyPlaylist);
        }
        Ok(Self {
            tracks,
            selected: 0,
        })
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[T] {
        &self.tracks
    }

    pub fn selected_track(&self) -> &T {
        &self.tracks[self.selected]
    }

    pub fn play(&self) {
        self.selected_track().play();
    }

    pub fn pause(&self) {
        self.selected_track().pause();
    }

    /// Handle the end of the track at `index`: select its successor and start it
    pub fn track_ended(&mut self, index: usize) {
        self.selected = next_track_index(index, self.tracks.len());
        log::debug!("Track {} ended, advancing to track {}", index, self.selected);
        self.tracks[self.selected].play();
    }
}
