use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, warn};

use crate::error::LyricsError;
use crate::library::{Track, TrackId};

use super::parse::{LyricLine, parse};

/// Where lyric text comes from.
pub trait LyricSource: Send + Sync {
    /// Raw LRC text for `track`. `Ok(None)` means the track has no lyrics.
    fn fetch(&self, track: &Track) -> Result<Option<String>, LyricsError>;
}

/// Reads `<stem>.lrc` next to the audio file, then from `lyrics_dir` if set.
#[derive(Debug, Clone, Default)]
pub struct FsLyricSource {
    lyrics_dir: Option<PathBuf>,
}

impl FsLyricSource {
    pub fn new(lyrics_dir: Option<PathBuf>) -> Self {
        Self { lyrics_dir }
    }

    fn candidates(&self, track: &Track) -> Vec<PathBuf> {
        let mut paths = vec![track.path.with_extension("lrc")];
        if let (Some(dir), Some(stem)) = (&self.lyrics_dir, track.path.file_stem()) {
            let mut name = stem.to_os_string();
            name.push(".lrc");
            paths.push(dir.join(name));
        }
        paths
    }
}

impl LyricSource for FsLyricSource {
    fn fetch(&self, track: &Track) -> Result<Option<String>, LyricsError> {
        for path in self.candidates(track) {
            match fs::read(&path) {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    return Ok(Some(text).filter(|t| !t.trim().is_empty()));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(LyricsError::Read { path, source }),
            }
        }
        Ok(None)
    }
}

/// Result of one lyric request, tagged with the switch that asked for it.
#[derive(Debug)]
pub struct LyricReply {
    pub generation: u64,
    pub track_id: TrackId,
    pub result: Result<Option<String>, LyricsError>,
}

/// Issues lyric requests without blocking the caller.
pub trait LyricFetcher {
    fn request(&self, generation: u64, track: &Track);
}

/// Runs each fetch on its own short-lived thread and posts the reply to a channel.
pub struct ThreadedFetcher {
    source: Arc<dyn LyricSource>,
    tx: Sender<LyricReply>,
}

impl ThreadedFetcher {
    pub fn new(source: Arc<dyn LyricSource>, tx: Sender<LyricReply>) -> Self {
        Self { source, tx }
    }
}

impl LyricFetcher for ThreadedFetcher {
    fn request(&self, generation: u64, track: &Track) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let track = track.clone();
        thread::spawn(move || {
            let result = source.fetch(&track);
            // The receiver only disappears on shutdown.
            let _ = tx.send(LyricReply {
                generation,
                track_id: track.id,
                result,
            });
        });
    }
}

/// Turn a fetch result into displayable lines. Missing, blank, untimed or
/// failed lyrics become a single placeholder line at 0s.
pub fn lines_from_result(
    result: Result<Option<String>, LyricsError>,
    placeholder: &str,
) -> Vec<LyricLine> {
    match result {
        Ok(Some(text)) => {
            let lines = parse(&text);
            if lines.is_empty() {
                debug!("lyrics have no time tags");
                vec![LyricLine::placeholder(placeholder)]
            } else {
                lines
            }
        }
        Ok(None) => {
            debug!("no lyrics for track");
            vec![LyricLine::placeholder(placeholder)]
        }
        Err(e) => {
            warn!(error = %e, "lyrics unavailable");
            vec![LyricLine::placeholder(placeholder)]
        }
    }
}
