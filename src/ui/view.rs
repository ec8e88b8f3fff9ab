use ratatui::layout::{Position, Rect};
use ratatui::widgets::{Paragraph, Wrap};

use crate::audio::PlayMode;
use crate::library::Track;
use crate::lyrics::{LyricLine, max_offset};
use crate::render::{LineMetrics, PlayIcon, RenderSink};
use crate::seek::ProgressGeometry;

/// Wrapping used by the lyric pane. `line_height` measures with the same rule.
pub const LYRIC_WRAP: Wrap = Wrap { trim: false };

/// Screen regions from the last drawn frame, used for mouse hit-testing.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Regions {
    /// Inner area of the track list.
    pub list: Rect,
    /// Queue index shown on the first row of `list`.
    pub list_start: usize,
    /// Inner area of the lyric pane.
    pub lyrics: Rect,
    pub gauge: Rect,
}

/// Terminal-side presentation state. `Player` writes it through `RenderSink`;
/// `ui::draw` reads it back each frame.
#[derive(Debug, Default)]
pub struct View {
    lines: Vec<String>,
    active_line: Option<usize>,
    scroll_offset: f64,
    track: Option<Track>,
    play_icon: PlayIcon,
    progress: f64,
    highlighted_track: Option<usize>,
    play_mode: PlayMode,
    queue_title: String,
    regions: Regions,
}

impl View {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn active_line(&self) -> Option<usize> {
        self.active_line
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn play_icon(&self) -> PlayIcon {
        self.play_icon
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn highlighted_track(&self) -> Option<usize> {
        self.highlighted_track
    }

    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    pub fn queue_title(&self) -> &str {
        &self.queue_title
    }

    pub fn regions(&self) -> Regions {
        self.regions
    }

    /// Record where the last frame put each region. A resized lyric pane
    /// re-clamps the scroll offset.
    pub fn set_regions(&mut self, regions: Regions) {
        let resized = regions.lyrics != self.regions.lyrics;
        self.regions = regions;
        if resized {
            self.scroll_offset = self.scroll_offset.min(max_offset(self));
        }
    }

    /// Gauge extent in terminal columns. The last column maps to the end.
    pub fn gauge_geometry(&self) -> Option<ProgressGeometry> {
        let gauge = self.regions.gauge;
        (gauge.width > 1).then(|| ProgressGeometry {
            origin_x: f64::from(gauge.x),
            width: f64::from(gauge.width - 1),
        })
    }

    pub fn in_gauge(&self, column: u16, row: u16) -> bool {
        self.regions.gauge.contains(Position::new(column, row))
    }

    pub fn in_lyrics(&self, column: u16, row: u16) -> bool {
        self.regions.lyrics.contains(Position::new(column, row))
    }

    pub fn in_list(&self, column: u16, row: u16) -> bool {
        self.regions.list.contains(Position::new(column, row))
    }

    /// Queue index under a click in the track list, if the row holds a track.
    pub fn list_index_at(&self, column: u16, row: u16, queue_len: usize) -> Option<usize> {
        if !self.in_list(column, row) {
            return None;
        }
        let index = self.regions.list_start + usize::from(row - self.regions.list.y);
        (index < queue_len).then_some(index)
    }
}

impl RenderSink for View {
    fn set_active_line(&mut self, index: Option<usize>) {
        self.active_line = index;
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    fn set_track_meta(&mut self, track: Option<&Track>) {
        self.track = track.cloned();
    }

    fn set_play_icon(&mut self, icon: PlayIcon) {
        self.play_icon = icon;
    }

    fn set_progress_fill(&mut self, fraction: f64) {
        self.progress = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    fn set_lyrics(&mut self, lines: &[LyricLine]) {
        self.lines = lines.iter().map(|l| l.text.clone()).collect();
    }

    fn set_highlighted_track(&mut self, index: Option<usize>) {
        self.highlighted_track = index;
    }

    fn set_play_mode(&mut self, mode: PlayMode) {
        self.play_mode = mode;
    }

    fn set_queue_title(&mut self, title: &str) {
        self.queue_title = title.to_string();
    }
}

impl LineMetrics for View {
    /// Rows a lyric line takes once word-wrapped to the pane width.
    fn line_height(&self, index: usize) -> f64 {
        let Some(text) = self.lines.get(index) else {
            return 0.0;
        };
        let width = self.regions.lyrics.width;
        if width == 0 {
            return 1.0;
        }
        Paragraph::new(text.as_str())
            .wrap(LYRIC_WRAP)
            .line_count(width)
            .max(1) as f64
    }

    fn container_height(&self) -> f64 {
        f64::from(self.regions.lyrics.height)
    }

    fn content_height(&self) -> f64 {
        (0..self.lines.len()).map(|i| self.line_height(i)).sum()
    }
}
