//! Music reactions to focus changes and the first user gesture

use crate::music::{Sequencer, Track};
use crate::settings::Settings;

/// Turn background music on or off and persist the choice
///
/// Disabling stops the music right away; enabling leaves it to the next
/// play request or first input.
pub fn set_music_enabled<T: Track + 'static>(settings: &mut Settings, music: &Sequencer<T>, enabled: bool) {
    settings.music_enabled = enabled;
    if !enabled {
        music.pause();
    }
    settings.save();
    log::info!("Music {}", if enabled { "enabled" } else { "disabled" });
}

/// Set whether losing focus pauses the music, and persist the choice
pub fn set_pause_music_on_blur(settings: &mut Settings, pause: bool) {
    settings.pause_music_on_blur = pause;
    settings.save();
}

/// Pauses music when the game loses focus and resumes it on return
#[derive(Debug, Default)]
pub struct AutoPause {
    resume_on_focus: bool,
}

impl AutoPause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab hidden or window blurred
    pub fn on_blur<T: Track + 'static>(&mut self, settings: &Settings, music: &Sequencer<T>) {
        if !settings.pause_music_on_blur || !music.is_playing() {
            return;
        }
        music.pause();
        self.resume_on_focus = true;
        log::info!("Music paused (focus lost)");
    }

    /// Tab visible or window focused again
    pub fn on_focus<T: Track + 'static>(&mut self, music: &Sequencer<T>) {
        if std::mem::take(&mut self.resume_on_focus) {
            music.play();
            log::info!("Music resumed");
        }
    }
}

/// Starts music on the first key or pointer press
#[derive(Debug, Default)]
pub struct MusicStarter {
    started: bool,
}

impl MusicStarter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this input started the music
    pub fn on_input<T: Track + 'static>(&mut self, settings: &Settings, music: &Sequencer<T>) -> bool {
        if self.started || !settings.autostart_music() {
            return false;
        }
        self.started = true;
        music.play();
        log::info!("Music started on first input");
        true
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::music::SilentTrack;

    fn music() -> Sequencer<SilentTrack> {
        let seq = Sequencer::new(vec![SilentTrack::new("a"), SilentTrack::new("b")]).unwrap();
        seq.setup();
        seq
    }

    #[test]
    fn test_blur_pauses_and_focus_resumes() {
        let music = music();
        let settings = Settings::default();
        let mut auto = AutoPause::new();

        music.play();
        auto.on_blur(&settings, &music);
        assert!(!music.is_playing());
        // visibilitychange and blur both fire; second one must not lose the resume
        auto.on_blur(&settings, &music);
        auto.on_focus(&music);
        assert!(music.is_playing());
    }

    #[test]
    fn test_focus_does_not_start_music_that_was_paused() {
        let music = music();
        let mut auto = AutoPause::new();
        auto.on_blur(&Settings::default(), &music);
        auto.on_focus(&music);
        assert!(!music.is_playing());
    }

    #[test]
    fn test_blur_respects_setting() {
        let music = music();
        let settings = Settings {
            pause_music_on_blur: false,
            ..Default::default()
        };
        let mut auto = AutoPause::new();
        music.play();
        auto.on_blur(&settings, &music);
        assert!(music.is_playing());
    }

    #[test]
    fn test_first_input_starts_music_once() {
        let music = music();
        let settings = Settings::default();
        let mut starter = MusicStarter::new();

        assert!(starter.on_input(&settings, &music));
        assert!(music.is_playing());
        music.pause();
        assert!(!starter.on_input(&settings, &music));
        assert!(!music.is_playing());
    }

    #[test]
    fn test_disabling_music_stops_it_and_blocks_autostart() {
        let music = music();
        let mut settings = Settings::default();
        music.play();

        set_music_enabled(&mut settings, &music, false);
        assert!(!settings.music_enabled);
        assert!(!music.is_playing());

        let mut starter = MusicStarter::new();
        assert!(!starter.on_input(&settings, &music));

        set_music_enabled(&mut settings, &music, true);
        assert!(settings.music_enabled);
        assert!(!music.is_playing());
        assert!(starter.on_input(&settings, &music));
        assert!(music.is_playing());
    }

    #[test]
    fn test_turning_off_pause_on_blur_keeps_music_playing() {
        let music = music();
        let mut settings = Settings::default();
        set_pause_music_on_blur(&mut settings, false);

        music.play();
        AutoPause::new().on_blur(&settings, &music);
        assert!(music.is_playing());
    }

    #[test]
    fn test_first_input_ignored_when_music_disabled() {
        let music = music();
        let settings = Settings {
            music_enabled: false,
            ..Default::default()
        };
        let mut starter = MusicStarter::new();
        assert!(!starter.on_input(&settings, &music));
        assert!(!music.is_playing());
    }
}
