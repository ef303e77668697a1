//! Browser music backend using `HtmlAudioElement`

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use super::{Sequencer, Track};
use crate::consts::MUSIC_TRACKS;
use crate::error::MusicError;

/// An audio element playing one resource file
#[derive(Clone)]
pub struct HtmlTrack {
    element: HtmlAudioElement,
    src: Rc<str>,
    ended: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl HtmlTrack {
    /// Create the audio element for `src` (loading starts in the background)
    pub fn load(src: &str) -> Result<Self, MusicError> {
        let element = HtmlAudioElement::new_with_src(src).map_err(|e| MusicError::TrackLoad {
            path: src.to_string(),
            reason: format!("{:?}", e),
        })?;
        Ok(Self {
            element,
            src: Rc::from(src),
            ended: Rc::new(RefCell::new(None)),
        })
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

/// Log a rejected play() promise (autoplay policy, missing file)
fn watch_playback(src: Rc<str>, promise: js_sys::Promise) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            log::warn!("Playback of {} was rejected: {:?}", src, e);
        }
    });
}

impl Track for HtmlTrack {
    fn play(&self) {
        match self.element.play() {
            Ok(promise) => watch_playback(self.src.clone(), promise),
            Err(e) => log::warn!("Failed to start {}: {:?}", self.src, e),
        }
    }

    fn pause(&self) {
        if let Err(e) = self.element.pause() {
            log::warn!("Failed to pause {}: {:?}", self.src, e);
        }
    }

    fn is_playing(&self) -> bool {
        !self.element.paused()
    }

    fn on_ended(&self, mut handler: Box<dyn FnMut()>) {
        self.clear_on_ended();
        let closure = Closure::<dyn FnMut()>::new(move || handler());
        if let Err(e) = self
            .element
            .add_event_listener_with_callback("ended", closure.as_ref().unchecked_ref())
        {
            log::warn!("Failed to watch {} for ended: {:?}", self.src, e);
            return;
        }
        *self.ended.borrow_mut() = Some(closure);
    }

    fn clear_on_ended(&self) {
        if let Some(closure) = self.ended.borrow_mut().take() {
            if let Err(e) = self
                .element
                .remove_event_listener_with_callback("ended", closure.as_ref().unchecked_ref())
            {
                log::warn!("Failed to stop watching {} for ended: {:?}", self.src, e);
            }
        }
    }
}

/// Background music backed by browser audio elements
pub struct Music {
    sequencer: Sequencer<HtmlTrack>,
}

impl Music {
    /// Build the looping playlist from the bundled track list
    pub fn new() -> Result<Self, MusicError> {
        Self::with_tracks(&MUSIC_TRACKS)
    }

    pub fn with_tracks(paths: &[&str]) -> Result<Self, MusicError> {
        let tracks = paths
            .iter()
            .map(|path| HtmlTrack::load(path))
            .collect::<Result<Vec<_>, _>>()?;
        let sequencer = Sequencer::new(tracks)?;
        sequencer.setup();
        Ok(Self { sequencer })
    }

    /// Start or resume the selected track (needs a prior user gesture)
    pub fn play_music(&self) {
        self.sequencer.play();
    }

    pub fn pause_music(&self) {
        self.sequencer.pause();
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    pub fn sequencer(&self) -> &Sequencer<HtmlTrack> {
        &self.sequencer
    }
}
