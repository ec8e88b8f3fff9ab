//! Deterministic doubles for the player's collaborators.

use std::cell::RefCell;
use std::path::PathBuf;

use crate::audio::{MediaResource, PlayMode};
use crate::library::{Track, TrackId};
use crate::lyrics::{LyricFetcher, LyricLine};
use crate::render::{LineMetrics, PlayIcon, RenderSink};

pub fn track(id: u32, title: &str) -> Track {
    Track {
        id: TrackId(id),
        path: PathBuf::from(format!("/music/{title}.mp3")),
        title: title.to_string(),
        artist: None,
        album: None,
        duration: None,
        bitrate: None,
        sample_rate: None,
        file_type: "mp3".to_string(),
    }
}

pub fn tracks(n: u32) -> Vec<Track> {
    (1..=n).map(|i| track(i, &format!("track-{i}"))).collect()
}

/// In-memory media slot. Seeks land immediately unless `drop_seeks` is set.
#[derive(Debug, Default)]
pub struct FakeMedia {
    pub source: Option<(TrackId, u64)>,
    pub playing: bool,
    pub time: f64,
    pub duration: Option<f64>,
    pub drop_seeks: bool,
    pub seeks: Vec<f64>,
    pub play_calls: usize,
    pub volume: Option<f32>,
}

impl MediaResource for FakeMedia {
    fn set_source(&mut self, track: &Track, generation: u64) {
        self.source = Some((track.id, generation));
        self.playing = false;
        self.time = 0.0;
        self.duration = None;
    }

    fn play(&mut self) {
        self.playing = true;
        self.play_calls += 1;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_paused(&self) -> bool {
        !self.playing
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.seeks.push(seconds);
        if !self.drop_seeks {
            self.time = seconds;
        }
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = Some(volume);
    }
}

#[derive(Debug, Default)]
pub struct RecordingFetcher {
    pub requests: RefCell<Vec<(u64, TrackId)>>,
}

impl LyricFetcher for RecordingFetcher {
    fn request(&self, generation: u64, track: &Track) {
        self.requests.borrow_mut().push((generation, track.id));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    ActiveLine(Option<usize>),
    ScrollOffset(f64),
    TrackMeta(Option<TrackId>),
    PlayIcon(PlayIcon),
    Progress(f64),
    Lyrics(usize),
    HighlightedTrack(Option<usize>),
    PlayMode(PlayMode),
    QueueTitle(String),
}

/// Records every render call. Each lyric line is `line_height` rows tall
/// in a pane `container` rows high.
#[derive(Debug)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    pub line_count: usize,
    pub line_height: f64,
    pub container: f64,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            line_count: 0,
            line_height: 2.0,
            container: 10.0,
        }
    }
}

impl RecordingSink {
    pub fn scroll_writes(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::ScrollOffset(o) => Some(*o),
                _ => None,
            })
            .collect()
    }

    pub fn last_active_line(&self) -> Option<Option<usize>> {
        self.calls.iter().rev().find_map(|c| match c {
            SinkCall::ActiveLine(i) => Some(*i),
            _ => None,
        })
    }
}

impl RenderSink for RecordingSink {
    fn set_active_line(&mut self, index: Option<usize>) {
        self.calls.push(SinkCall::ActiveLine(index));
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.calls.push(SinkCall::ScrollOffset(offset));
    }

    fn set_track_meta(&mut self, track: Option<&Track>) {
        self.calls.push(SinkCall::TrackMeta(track.map(|t| t.id)));
    }

    fn set_play_icon(&mut self, icon: PlayIcon) {
        self.calls.push(SinkCall::PlayIcon(icon));
    }

    fn set_progress_fill(&mut self, fraction: f64) {
        self.calls.push(SinkCall::Progress(fraction));
    }

    fn set_lyrics(&mut self, lines: &[LyricLine]) {
        self.line_count = lines.len();
        self.calls.push(SinkCall::Lyrics(lines.len()));
    }

    fn set_highlighted_track(&mut self, index: Option<usize>) {
        self.calls.push(SinkCall::HighlightedTrack(index));
    }

    fn set_play_mode(&mut self, mode: PlayMode) {
        self.calls.push(SinkCall::PlayMode(mode));
    }

    fn set_queue_title(&mut self, title: &str) {
        self.calls.push(SinkCall::QueueTitle(title.to_string()));
    }
}

impl LineMetrics for RecordingSink {
    fn line_height(&self, _index: usize) -> f64 {
        self.line_height
    }

    fn container_height(&self) -> f64 {
        self.container
    }

    fn content_height(&self) -> f64 {
        self.line_height * self.line_count as f64
    }
}
