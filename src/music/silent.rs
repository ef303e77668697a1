//! Headless music backend for native builds
//!
//! Native builds have no audio output; tracks only record their state so the
//! sequencing logic behaves the same as in the browser.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{Sequencer, Track};
use crate::consts::MUSIC_TRACKS;
use crate::error::MusicError;

struct SilentInner {
    name: String,
    playing: Cell<bool>,
    plays: Cell<u32>,
    ended: RefCell<Option<Box<dyn FnMut()>>>,
}

/// A track that never makes a sound
#[derive(Clone)]
pub struct SilentTrack {
    inner: Rc<SilentInner>,
}

impl SilentTrack {
    pub fn new(name: &str) -> Self {
        Self {
            inner: Rc::new(SilentInner {
                name: name.to_string(),
                playing: Cell::new(false),
                plays: Cell::new(0),
                ended: RefCell::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of times playback was started
    pub fn play_count(&self) -> u32 {
        self.inner.plays.get()
    }

    pub fn has_ended_handler(&self) -> bool {
        self.inner.ended.borrow().is_some()
    }

    /// Reach the end of the track, firing the ended handler
    pub fn finish(&self) {
        self.inner.playing.set(false);
        let handler = self.inner.ended.borrow_mut().take();
        if let Some(mut handler) = handler {
            handler();
            // Keep the handler unless it was replaced or cleared while running
            let mut slot = self.inner.ended.borrow_mut();
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
    }
}

impl Track for SilentTrack {
    fn play(&self) {
        self.inner.playing.set(true);
        self.inner.plays.set(self.inner.plays.get() + 1);
        log::debug!("(silent) playing {}", self.inner.name);
    }

    fn pause(&self) {
        self.inner.playing.set(false);
    }

    fn is_playing(&self) -> bool {
        self.inner.playing.get()
    }

    fn on_ended(&self, handler: Box<dyn FnMut()>) {
        *self.inner.ended.borrow_mut() = Some(handler);
    }

    fn clear_on_ended(&self) {
        self.inner.ended.borrow_mut().take();
    }
}

/// Background music (native stub)
pub struct Music {
    sequencer: Sequencer<SilentTrack>,
}

impl Music {
    /// Build the looping playlist from the bundled track list
    pub fn new() -> Result<Self, MusicError> {
        Self::with_tracks(&MUSIC_TRACKS)
    }

    pub fn with_tracks(paths: &[&str]) -> Result<Self, MusicError> {
        let tracks: Vec<SilentTrack> = paths.iter().map(|path| SilentTrack::new(path)).collect();
        let sequencer = Sequencer::new(tracks)?;
        sequencer.setup();
        log::info!("Native build - music is silent");
        Ok(Self { sequencer })
    }

    pub fn play_music(&self) {
        self.sequencer.play();
    }

    pub fn pause_music(&self) {
        self.sequencer.pause();
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    pub fn sequencer(&self) -> &Sequencer<SilentTrack> {
        &self.sequencer
    }
}
