use std::sync::{Arc, mpsc::Sender};
use std::time::Duration;

use crate::app::PlayerOptions;
use crate::config;
use crate::lyrics::{FsLyricSource, LyricReply, ThreadedFetcher};

pub fn player_options(settings: &config::Settings) -> PlayerOptions {
    PlayerOptions {
        play_mode: settings.playback.play_mode.into(),
        volume: settings.playback.volume,
        quiet_period: Duration::from_millis(settings.lyrics.scroll_quiet_ms),
        browsing_hold: Duration::from_millis(settings.lyrics.browsing_hold_ms),
        placeholder: settings.lyrics.placeholder_text.clone(),
    }
}

pub fn lyric_fetcher(settings: &config::Settings, replies: Sender<LyricReply>) -> ThreadedFetcher {
    let source = FsLyricSource::new(settings.lyrics.lyrics_dir.clone());
    ThreadedFetcher::new(Arc::new(source), replies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PlayMode;
    use crate::config::PlayModeSetting;

    #[test]
    fn player_options_follow_settings() {
        let mut settings = config::Settings::default();
        settings.playback.play_mode = PlayModeSetting::Shuffle;
        settings.playback.volume = 35;
        settings.lyrics.scroll_quiet_ms = 2000;
        settings.lyrics.browsing_hold_ms = 2500;
        settings.lyrics.placeholder_text = "nothing here".to_string();

        let options = player_options(&settings);
        assert_eq!(options.play_mode, PlayMode::Shuffle);
        assert_eq!(options.volume, 35);
        assert_eq!(options.quiet_period, Duration::from_millis(2000));
        assert_eq!(options.browsing_hold, Duration::from_millis(2500));
        assert_eq!(options.placeholder, "nothing here");
    }
}
