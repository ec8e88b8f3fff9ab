use std::time::{Duration, Instant};

use tracing::debug;

use crate::render::{LineMetrics, RenderSink};

use super::parse::{LyricLine, active_index};
use super::scroll::{ScrollSuppression, centered_offset, max_offset};

/// Keeps the lyric pane's highlight and scroll position in step with playback.
#[derive(Debug, Clone)]
pub struct LyricSync {
    lines: Vec<LyricLine>,
    current: Option<usize>,
    scroll_offset: f64,
    suppression: ScrollSuppression,
    autoscroll: bool,
}

impl LyricSync {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            lines: Vec::new(),
            current: None,
            scroll_offset: 0.0,
            suppression: ScrollSuppression::new(quiet_period),
            autoscroll: true,
        }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn autoscroll_enabled(&self) -> bool {
        self.autoscroll
    }

    pub fn is_user_scrolling(&self, now: Instant) -> bool {
        self.suppression.is_active(now)
    }

    /// Empty the pane and drop the highlight.
    pub fn reset<V: RenderSink>(&mut self, view: &mut V) {
        self.load(Vec::new(), view);
    }

    /// Show a new set of lines, unhighlighted and scrolled to the top.
    pub fn load<V: RenderSink>(&mut self, lines: Vec<LyricLine>, view: &mut V) {
        self.lines = lines;
        self.current = None;
        self.scroll_offset = 0.0;
        view.set_active_line(None);
        view.set_lyrics(&self.lines);
        view.set_scroll_offset(0.0);
    }

    /// Drop the highlight without touching the lines.
    pub fn clear_highlight<V: RenderSink>(&mut self, view: &mut V) {
        self.current = None;
        view.set_active_line(None);
    }

    /// Recompute the active line for playback position `t`.
    ///
    /// The view is only touched when the index changes. The pane recentres
    /// on the new line unless autoscroll is locked, the user scrolled within
    /// the quiet period, or `browsing` is set. Returns whether the index moved.
    pub fn sync<V: RenderSink + LineMetrics>(
        &mut self,
        t: f64,
        now: Instant,
        browsing: bool,
        view: &mut V,
    ) -> bool {
        let next = active_index(&self.lines, t);
        if next == self.current {
            return false;
        }

        self.current = next;
        view.set_active_line(next);

        if let Some(index) = next {
            if self.autoscroll && !browsing && !self.suppression.is_active(now) {
                self.scroll_offset = centered_offset(&*view, index);
                view.set_scroll_offset(self.scroll_offset);
            } else {
                debug!(index, "autoscroll held");
            }
        }
        true
    }

    /// Manual scroll by `delta` (positive scrolls down).
    pub fn on_user_scroll<V: RenderSink + LineMetrics>(
        &mut self,
        delta: f64,
        now: Instant,
        view: &mut V,
    ) {
        self.suppression.on_user_scroll(now);
        self.scroll_offset = (self.scroll_offset + delta).clamp(0.0, max_offset(&*view));
        view.set_scroll_offset(self.scroll_offset);
    }

    pub fn tick(&mut self, now: Instant) {
        if self.suppression.expire(now) {
            debug!("manual scroll settled");
        }
    }

    /// Flip the autoscroll lock. Returns the new state.
    pub fn toggle_autoscroll(&mut self) -> bool {
        self.autoscroll = !self.autoscroll;
        if self.autoscroll {
            self.suppression.clear();
        }
        self.autoscroll
    }
}

impl Default for LyricSync {
    fn default() -> Self {
        Self::new(super::scroll::DEFAULT_QUIET_PERIOD)
    }
}
