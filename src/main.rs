//! Apprentice web entry point
//!
//! On the web the game's JS side drives everything through
//! `GameServices`; the start function only sets up logging. The native
//! build opens the file-backed save slot and the silent playlist.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    apprentice_web::platform::init_logging();
    log::info!("Apprentice web glue loaded");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use apprentice_web::consts::NATIVE_SAVE_DIR;
    use apprentice_web::persistence::FileStore;
    use apprentice_web::{Music, SaveStore, Settings};

    apprentice_web::platform::init_logging();
    log::info!("Apprentice (native) starting...");

    let settings = Settings::load();

    let saves: SaveStore<String, _> = SaveStore::new(FileStore::new(NATIVE_SAVE_DIR))
        .with_error_handler(|op, _| {
            log::error!("Save file may be out of sync after failed {}", op.as_str())
        })
        .open();
    if saves.has() {
        log::info!("Found saved game in {}", saves.backend().path_for(saves.key()).display());
    } else {
        log::info!("No saved game");
    }

    match Music::new() {
        Ok(music) => {
            if settings.music_enabled {
                music.play_music();
            }
            log::info!(
                "Music: {} tracks, playing track {}",
                music.sequencer().track_count(),
                music.sequencer().selected() + 1
            );
        }
        Err(e) => log::error!("Music disabled: {}", e),
    }
}
