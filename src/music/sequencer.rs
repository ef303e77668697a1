//! Event-driven owner of a playlist

use std::cell::RefCell;
use std::rc::Rc;

use super::{Playlist, Track};
use crate::error::MusicError;

/// Drives a [`Playlist`] from its tracks' ended notifications
///
/// Ended handlers hold a weak reference to the playlist, so dropping the
/// sequencer tears everything down; handlers that fire afterwards do nothing.
pub struct Sequencer<T: Track + 'static> {
    playlist: Rc<RefCell<Playlist<T>>>,
}

impl<T: Track + 'static> Sequencer<T> {
    /// Create a sequencer over a non-empty track list
    pub fn new(tracks: Vec<T>) -> Result<Self, MusicError> {
        let playlist = Playlist::new(tracks)?;
        Ok(Self {
            playlist: Rc::new(RefCell::new(playlist)),
        })
    }

    /// Register an ended handler on every track so playback advances on its own
    pub fn setup(&self) {
        let playlist = self.playlist.borrow();
        for (index, track) in playlist.tracks().iter().enumerate() {
            let weak = Rc::downgrade(&self.playlist);
            track.on_ended(Box::new(move || {
                if let Some(playlist) = weak.upgrade() {
                    playlist.borrow_mut().track_ended(index);
                }
            }));
        }
        log::info!("Music sequencer ready ({} tracks)", playlist.track_count());
    }

    /// Start or resume the selected track
    pub fn play(&self) {
        self.playlist.borrow().play();
    }

    /// Pause the selected track
    pub fn pause(&self) {
        self.playlist.borrow().pause();
    }

    pub fn selected(&self) -> usize {
        self.playlist.borrow().selected()
    }

    pub fn track_count(&self) -> usize {
        self.playlist.borrow().track_count()
    }

    pub fn is_playing(&self) -> bool {
        self.playlist.borrow().selected_track().is_playing()
    }
}

impl<T: Track + Clone + 'static> Sequencer<T> {
    /// Handle to the selected track
    ///
    /// Returned by value so the playlist is not borrowed while the caller
    /// drives the track (firing its ended handler re-enters the playlist).
    pub fn selected_track(&self) -> T {
        self.playlist.borrow().selected_track().clone()
    }
}

impl<T: Track + 'static> Drop for Sequencer<T> {
    fn drop(&mut self) {
        if let Ok(playlist) = self.playlist.try_borrow() {
            for track in playlist.tracks() {
                track.clear_on_ended();
            }
        }
    }
}
