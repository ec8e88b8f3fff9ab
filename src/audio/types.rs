//! Audio-related small types and handles.
//!
//! Play modes and the resolver's vocabulary, the command set understood by
//! the audio thread, the events it reports back, and the shared playback
//! snapshot read by the UI and MPRIS.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What happens when a track ends or the user skips.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayMode {
    /// Play through the queue once and stop after the last track.
    Sequential,
    /// Repeat the current track.
    SingleRepeat,
    /// Wrap around to the start of the queue.
    #[default]
    ListRepeat,
    /// Pick a uniformly random track each time.
    Shuffle,
}

impl PlayMode {
    /// Next mode in the toggle order.
    pub fn cycle(self) -> Self {
        match self {
            Self::Sequential => Self::SingleRepeat,
            Self::SingleRepeat => Self::ListRepeat,
            Self::ListRepeat => Self::Shuffle,
            Self::Shuffle => Self::Sequential,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sequential => "Sequential",
            Self::SingleRepeat => "Repeat one",
            Self::ListRepeat => "Repeat all",
            Self::Shuffle => "Shuffle",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    Index(usize),
    Stop,
}

/// Notifications from a media resource. Every event carries the generation
/// of the `set_source` call it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// The source is decodable and seekable.
    Ready {
        generation: u64,
        duration: Option<f64>,
    },
    TimeUpdate { generation: u64, time: f64 },
    Ended { generation: u64 },
    Failed { generation: u64, reason: String },
}

impl MediaEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Ready { generation, .. }
            | Self::TimeUpdate { generation, .. }
            | Self::Ended { generation }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current source with `path`. Loads paused.
    Load {
        path: PathBuf,
        generation: u64,
        duration_hint: Option<Duration>,
    },
    /// Resume the loaded source.
    Play,
    /// Pause the loaded source.
    Pause,
    /// Jump to an absolute position in the loaded source.
    Seek(Duration),
    /// Linear gain in `[0, 1]`.
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information shared with the UI.
pub struct PlaybackInfo {
    /// Generation of the source these values describe.
    pub generation: u64,
    /// Position in the current source.
    pub elapsed: Duration,
    /// Source length, once known.
    pub duration: Option<Duration>,
    /// Whether the source is paused (or nothing is loaded).
    pub paused: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
