//! Browser wiring and the JS-facing API

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use super::{AutoPause, MusicStarter, set_music_enabled, set_pause_music_on_blur};
use crate::music::Music;
use crate::persistence::{LocalStorageStore, SaveStore};
use crate::settings::Settings;

/// Music plus the state of its browser-driven controls
struct MusicControls {
    music: Music,
    settings: Settings,
    auto_pause: AutoPause,
    starter: MusicStarter,
}

fn listen(target: &web_sys::EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::<dyn FnMut(_)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        log::warn!("Failed to listen for {}: {:?}", event, e);
    }
    // Listeners live for the whole page
    closure.forget();
}

/// Hook music up to visibility, focus and first-input events
fn install_music_controls(controls: Rc<RefCell<MusicControls>>) {
    let Some(window) = web_sys::window() else {
        log::error!("No window - music controls not installed");
        return;
    };
    let Some(document) = window.document() else {
        log::error!("No document - music controls not installed");
        return;
    };

    // Visibility change (tab switch, minimize)
    {
        let controls = controls.clone();
        let doc = document.clone();
        listen(&document, "visibilitychange", move |_event: web_sys::Event| {
            let mut c = controls.borrow_mut();
            let c = &mut *c;
            if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                c.auto_pause.on_blur(&c.settings, c.music.sequencer());
            } else {
                c.auto_pause.on_focus(c.music.sequencer());
            }
        });
    }

    // Window blur/focus (click outside)
    {
        let controls = controls.clone();
        listen(&window, "blur", move |_event: web_sys::Event| {
            let mut c = controls.borrow_mut();
            let c = &mut *c;
            c.auto_pause.on_blur(&c.settings, c.music.sequencer());
        });
    }
    {
        let controls = controls.clone();
        listen(&window, "focus", move |_event: web_sys::Event| {
            let mut c = controls.borrow_mut();
            let c = &mut *c;
            c.auto_pause.on_focus(c.music.sequencer());
        });
    }

    // Browsers only allow audio after a user gesture
    {
        let controls = controls.clone();
        listen(&window, "pointerdown", move |_event: web_sys::Event| {
            let mut c = controls.borrow_mut();
            let c = &mut *c;
            c.starter.on_input(&c.settings, c.music.sequencer());
        });
    }
    listen(&window, "keydown", move |_event: web_sys::Event| {
        let mut c = controls.borrow_mut();
        let c = &mut *c;
        c.starter.on_input(&c.settings, c.music.sequencer());
    });
}

/// Music and save-game services for the game's JS side
#[wasm_bindgen]
pub struct GameServices {
    saves: SaveStore<String, LocalStorageStore>,
    music: Option<Rc<RefCell<MusicControls>>>,
}

impl Default for GameServices {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GameServices {
    /// Open the save slot and set up background music
    #[wasm_bindgen(constructor)]
    pub fn new() -> GameServices {
        super::init_logging();

        let saves = SaveStore::new(LocalStorageStore).open();

        let settings = Settings::load();
        let music = match Music::new() {
            Ok(music) => {
                let controls = Rc::new(RefCell::new(MusicControls {
                    music,
                    settings,
                    auto_pause: AutoPause::new(),
                    starter: MusicStarter::new(),
                }));
                install_music_controls(controls.clone());
                Some(controls)
            }
            Err(e) => {
                log::error!("Music disabled: {}", e);
                None
            }
        };

        GameServices { saves, music }
    }

    /// Store the save text exactly as given
    pub fn save_game_data(&self, data: &str) {
        self.saves.save(data.to_string());
    }

    pub fn load_game_data(&self) -> Option<String> {
        self.saves.load()
    }

    pub fn delete_game_data(&self) {
        self.saves.delete();
    }

    pub fn has_game_data(&self) -> bool {
        self.saves.has()
    }

    /// Whether the stored save has finished loading
    pub fn is_save_ready(&self) -> bool {
        self.saves.is_ready()
    }

    pub fn play_music(&self) {
        if let Some(controls) = &self.music {
            controls.borrow().music.play_music();
        }
    }

    pub fn pause_music(&self) {
        if let Some(controls) = &self.music {
            controls.borrow().music.pause_music();
        }
    }

    /// Turn background music on or off (saved with the settings)
    pub fn set_music_enabled(&self, enabled: bool) {
        if let Some(controls) = &self.music {
            let mut c = controls.borrow_mut();
            let c = &mut *c;
            set_music_enabled(&mut c.settings, c.music.sequencer(), enabled);
        }
    }

    /// Choose whether hiding the tab or leaving the window pauses music
    pub fn set_pause_music_on_blur(&self, pause: bool) {
        if let Some(controls) = &self.music {
            set_pause_music_on_blur(&mut controls.borrow_mut().settings, pause);
        }
    }
}
