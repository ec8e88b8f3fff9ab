use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Stable identity of a scanned track. Assigned in library order, starting at 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    /// Audio bitrate in kbps, when the container reports one.
    pub bitrate: Option<u32>,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Lowercase file extension, e.g. `flac`.
    pub file_type: String,
}

impl Track {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|s| s.to_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaylistId {
    /// Every scanned track, in library order.
    All,
    /// A `.m3u`/`.m3u8` file found at the library root, by discovery index.
    File(usize),
}

#[derive(Debug, Clone)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub tracks: Vec<Track>,
}
