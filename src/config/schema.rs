use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/lyra/config.toml` or `~/.config/lyra/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `LYRA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub playback: PlaybackSettings,
    pub display: DisplaySettings,
    pub lyrics: LyricsSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// How often the audio thread reports the playback position (milliseconds).
    pub progress_interval_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 500,
            progress_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top "lyra" header box.
    pub header_text: String,
    /// Keep the list cursor on the playing track when playback advances by itself.
    pub follow_playback: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ lyra: music with the words ~ ".to_string(),
            follow_playback: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press, in percent.
    pub volume_step: u8,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Play mode at startup; updated when the mode is toggled.
    #[serde(alias = "playMode", alias = "playmode", alias = "defaultPlayMode")]
    pub play_mode: PlayModeSetting,
    /// Volume in percent (0-100); updated when the volume is changed.
    #[serde(alias = "defaultVolume")]
    pub volume: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            play_mode: PlayModeSetting::ListRepeat,
            volume: 80,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayModeSetting {
    #[serde(alias = "in-order", alias = "no-loop")]
    Sequential,
    #[serde(
        alias = "single_repeat",
        alias = "repeat-one",
        alias = "loop-one",
        alias = "single"
    )]
    SingleRepeat,
    #[serde(
        alias = "list_repeat",
        alias = "repeat-all",
        alias = "loop-all",
        alias = "list"
    )]
    ListRepeat,
    #[serde(alias = "random")]
    Shuffle,
}

/// Which track details are shown in the list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplaySettings {
    #[serde(alias = "showArtist", alias = "showartist")]
    pub show_artist: bool,
    #[serde(alias = "showAlbum", alias = "showalbum")]
    pub show_album: bool,
    #[serde(alias = "showFilename", alias = "showfilename")]
    pub show_filename: bool,
    #[serde(alias = "showBitrate", alias = "showbitrate")]
    pub show_bitrate: bool,
    #[serde(alias = "showSampleRate", alias = "showsamplerate")]
    pub show_sample_rate: bool,
    #[serde(alias = "showFileType", alias = "showfiletype")]
    pub show_file_type: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_artist: true,
            show_album: true,
            show_filename: true,
            show_bitrate: true,
            show_sample_rate: true,
            show_file_type: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LyricsSettings {
    /// Autoscroll stays off for this long after the last manual scroll (milliseconds).
    pub scroll_quiet_ms: u64,
    /// Autoscroll hold after picking a track from the list (1000-3000 ms).
    pub browsing_hold_ms: u64,
    /// Extra directory searched for `<stem>.lrc`.
    pub lyrics_dir: Option<PathBuf>,
    /// Shown when a track has no lyrics.
    pub placeholder_text: String,
    /// Rows scrolled per mouse-wheel notch.
    pub wheel_rows: u16,
}

impl Default for LyricsSettings {
    fn default() -> Self {
        Self {
            scroll_quiet_ms: 1500,
            browsing_hold_ms: 1000,
            lyrics_dir: None,
            placeholder_text: "No lyrics".to_string(),
            wheel_rows: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
            ],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

impl From<PlayModeSetting> for crate::audio::PlayMode {
    fn from(setting: PlayModeSetting) -> Self {
        match setting {
            PlayModeSetting::Sequential => Self::Sequential,
            PlayModeSetting::SingleRepeat => Self::SingleRepeat,
            PlayModeSetting::ListRepeat => Self::ListRepeat,
            PlayModeSetting::Shuffle => Self::Shuffle,
        }
    }
}

impl From<crate::audio::PlayMode> for PlayModeSetting {
    fn from(mode: crate::audio::PlayMode) -> Self {
        match mode {
            crate::audio::PlayMode::Sequential => Self::Sequential,
            crate::audio::PlayMode::SingleRepeat => Self::SingleRepeat,
            crate::audio::PlayMode::ListRepeat => Self::ListRepeat,
            crate::audio::PlayMode::Shuffle => Self::Shuffle,
        }
    }
}
