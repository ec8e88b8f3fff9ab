//! Seeking from the progress gauge.
//!
//! A seek is applied to the media resource immediately and then verified:
//! if the reported position has not converged after a short window, the
//! target is re-applied once on the resource's next `Ready`, and the pending
//! seek is abandoned after a timeout or a track switch.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::audio::MediaResource;

/// Reported and requested positions closer than this count as converged.
pub const SEEK_EPSILON: f64 = 0.1;
pub const VERIFY_WINDOW: Duration = Duration::from_millis(100);
pub const RETRY_TIMEOUT: Duration = Duration::from_secs(1);

/// Horizontal extent of the progress gauge, in pointer coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProgressGeometry {
    pub origin_x: f64,
    pub width: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SeekOutcome {
    /// No known, positive duration (or zero-width gauge); nothing was done.
    CannotSeek,
    Requested { target: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Stage {
    Verifying { at: Instant },
    AwaitingReady,
}

#[derive(Debug, Clone)]
struct PendingSeek {
    target: f64,
    generation: u64,
    resume: bool,
    stage: Stage,
    expires: Instant,
}

fn known_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}

/// Map a pointer position over the gauge to a time in seconds.
pub fn target_time(pointer_x: f64, geometry: &ProgressGeometry, duration: Option<f64>) -> Option<f64> {
    let duration = known_duration(duration)?;
    if !(geometry.width > 0.0) || !pointer_x.is_finite() {
        return None;
    }
    let fraction = ((pointer_x - geometry.origin_x) / geometry.width).clamp(0.0, 1.0);
    Some(fraction * duration)
}

fn restore_playback<M: MediaResource + ?Sized>(media: &mut M, resume: bool) {
    if resume && media.is_paused() {
        media.play();
    }
}

#[derive(Debug, Default)]
pub struct SeekController {
    pending: Option<PendingSeek>,
}

impl SeekController {
    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget any pending seek. Called on every track switch.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            debug!("pending seek cancelled");
        }
    }

    pub fn seek<M: MediaResource + ?Sized>(
        &mut self,
        media: &mut M,
        pointer_x: f64,
        geometry: &ProgressGeometry,
        generation: u64,
        now: Instant,
    ) -> SeekOutcome {
        match target_time(pointer_x, geometry, media.duration()) {
            Some(target) => self.seek_to(media, target, generation, now),
            None => {
                debug!(pointer_x, "seek ignored: no duration or gauge width");
                SeekOutcome::CannotSeek
            }
        }
    }

    /// Seek to `target` seconds, clamped to the track.
    pub fn seek_to<M: MediaResource + ?Sized>(
        &mut self,
        media: &mut M,
        target: f64,
        generation: u64,
        now: Instant,
    ) -> SeekOutcome {
        let Some(duration) = known_duration(media.duration()) else {
            debug!(target, "seek ignored: duration unknown");
            return SeekOutcome::CannotSeek;
        };
        let target = if target.is_finite() { target.clamp(0.0, duration) } else { 0.0 };

        // A drag issues seeks back to back; keep the play state from before the first.
        let resume = match &self.pending {
            Some(p) if p.generation == generation => p.resume,
            _ => !media.is_paused(),
        };

        media.set_current_time(target);
        self.pending = Some(PendingSeek {
            target,
            generation,
            resume,
            stage: Stage::Verifying {
                at: now + VERIFY_WINDOW,
            },
            expires: now + RETRY_TIMEOUT,
        });
        SeekOutcome::Requested { target }
    }

    /// Advance the verify/expiry deadlines.
    pub fn poll<M: MediaResource + ?Sized>(&mut self, media: &mut M, generation: u64, now: Instant) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };

        if pending.generation != generation || now >= pending.expires {
            debug!(target = pending.target, "pending seek expired");
            self.pending = None;
            return;
        }

        if let Stage::Verifying { at } = pending.stage {
            if now < at {
                return;
            }
            if (media.current_time() - pending.target).abs() < SEEK_EPSILON {
                let resume = pending.resume;
                self.pending = None;
                restore_playback(media, resume);
            } else {
                debug!(
                    target = pending.target,
                    reported = media.current_time(),
                    "seek not applied yet, waiting for ready"
                );
                pending.stage = Stage::AwaitingReady;
            }
        }
    }

    /// The resource became ready (again). Re-applies a pending target once.
    /// Returns true when a seek was re-applied.
    pub fn on_ready<M: MediaResource + ?Sized>(&mut self, media: &mut M, generation: u64) -> bool {
        match self.pending.take() {
            Some(pending) if pending.generation == generation => {
                debug!(target = pending.target, "re-applying seek after ready");
                media.set_current_time(pending.target);
                restore_playback(media, pending.resume);
                true
            }
            Some(_) => false,
            None => false,
        }
    }
}
