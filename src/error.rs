//! Error types for the fallible edges of the player: the library scan,
//! lyric retrieval, the audio backend and settings persistence.
//!
//! None of these are fatal to the playback loop. Callers log them and fall
//! back (placeholder lyric, paused state, default settings).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read playlist {path:?}: {source}")]
    Playlist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown playlist: {0}")]
    UnknownPlaylist(String),
}

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("failed to read lyrics {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    NoDevice(String),

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] ::config::ConfigError),

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write settings to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no config path could be resolved (set LYRA_CONFIG_PATH or HOME)")]
    NoPath,
}
