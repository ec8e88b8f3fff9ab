//! The boundary between playback state and whatever draws it.
//!
//! `Player` pushes presentation changes through `RenderSink` and reads lyric
//! geometry back through `LineMetrics`. The terminal view implements both;
//! tests use a recording double.

use crate::audio::PlayMode;
use crate::library::Track;
use crate::lyrics::LyricLine;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayIcon {
    Playing,
    #[default]
    Paused,
}

pub trait RenderSink {
    /// Highlight lyric line `index`; `None` removes any highlight.
    fn set_active_line(&mut self, index: Option<usize>);
    fn set_scroll_offset(&mut self, offset: f64);
    fn set_track_meta(&mut self, track: Option<&Track>);
    fn set_play_icon(&mut self, icon: PlayIcon);
    /// Fraction of the track played, in `[0, 1]`.
    fn set_progress_fill(&mut self, fraction: f64);
    fn set_lyrics(&mut self, lines: &[LyricLine]);
    fn set_highlighted_track(&mut self, index: Option<usize>);
    fn set_play_mode(&mut self, mode: PlayMode);
    fn set_queue_title(&mut self, title: &str);
}

/// Measured geometry of the lyric pane, in the pane's own units.
pub trait LineMetrics {
    fn line_height(&self, index: usize) -> f64;
    fn container_height(&self) -> f64;
    fn content_height(&self) -> f64;
}
