use std::time::{Duration, Instant};

use crate::render::LineMetrics;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1500);
pub const DEFAULT_BROWSING_HOLD: Duration = Duration::from_millis(1000);

/// Suppresses autoscroll while the user is scrolling the lyric pane.
///
/// Every manual scroll pushes the deadline out by the quiet period; the
/// suppression lifts once no scroll has arrived for that long.
#[derive(Debug, Clone)]
pub struct ScrollSuppression {
    quiet_period: Duration,
    deadline: Option<Instant>,
}

impl ScrollSuppression {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    pub fn on_user_scroll(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet_period);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now < d)
    }

    /// Drop an elapsed deadline. Returns true when suppression just ended.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.deadline.is_some_and(|d| now >= d) {
            self.deadline = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}

impl Default for ScrollSuppression {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

/// Set when a track is picked from the list, so the lyric pane does not
/// jump while the user is looking at the list.
#[derive(Debug, Clone)]
pub struct BrowsingFlag {
    hold: Duration,
    until: Option<Instant>,
}

impl BrowsingFlag {
    pub fn new(hold: Duration) -> Self {
        Self { hold, until: None }
    }

    pub fn set(&mut self, now: Instant) {
        self.until = Some(now + self.hold);
    }

    pub fn clear(&mut self) {
        self.until = None;
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|u| now < u)
    }

    pub fn expire(&mut self, now: Instant) {
        if self.until.is_some_and(|u| now >= u) {
            self.until = None;
        }
    }
}

impl Default for BrowsingFlag {
    fn default() -> Self {
        Self::new(DEFAULT_BROWSING_HOLD)
    }
}

/// Largest valid scroll offset for the current content.
pub fn max_offset(metrics: &(impl LineMetrics + ?Sized)) -> f64 {
    (metrics.content_height() - metrics.container_height()).max(0.0)
}

/// Scroll offset that puts the middle of line `index` at the middle of the
/// pane, clamped to `[0, max_offset]`.
pub fn centered_offset(metrics: &(impl LineMetrics + ?Sized), index: usize) -> f64 {
    let before: f64 = (0..index).map(|i| metrics.line_height(i)).sum();
    let target =
        before + metrics.line_height(index) / 2.0 - metrics.container_height() / 2.0;
    target.clamp(0.0, max_offset(metrics))
}
