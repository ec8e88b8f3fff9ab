//! The playback state machine.
//!
//! `Player` owns the queue, the single media resource and the lyric view,
//! and is driven entirely through its methods: user intents (select, toggle,
//! next/previous, seek, scroll), generation-tagged messages from the media
//! resource and the lyric fetcher, frame notifications, and `tick` for
//! deadlines. Messages from a superseded track switch are dropped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace, warn};

use crate::audio::{Direction, MediaEvent, MediaResource, PlayMode, Resolution, resolve};
use crate::library::Track;
use crate::lyrics::{
    BrowsingFlag, DEFAULT_BROWSING_HOLD, DEFAULT_QUIET_PERIOD, LyricFetcher, LyricLine,
    LyricReply, LyricSync, lines_from_result,
};
use crate::render::{LineMetrics, PlayIcon, RenderSink};
use crate::seek::{ProgressGeometry, SeekController, SeekOutcome};

/// Frames the view gets to lay out new lyrics before the first highlight.
const SETTLE_FRAMES: u8 = 2;

#[derive(Debug, Clone)]
pub struct Queue {
    pub name: String,
    pub tracks: Arc<[Track]>,
}

impl Queue {
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks: tracks.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new("", Vec::new())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing selected yet, stopped, or the queue ran out.
    #[default]
    Idle,
    /// Waiting for the media to become ready and the lyrics to settle.
    Loading,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub play_mode: PlayMode,
    pub phase: Phase,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum LyricsStage {
    Fetching,
    Settling { frames_left: u8 },
    Settled,
}

/// An in-flight track switch. Playback starts once both halves are done.
#[derive(Debug, Clone)]
struct PendingSwitch {
    generation: u64,
    media_ready: bool,
    lyrics: LyricsStage,
    autoplay: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerOptions {
    pub play_mode: PlayMode,
    /// Percent, `0..=100`.
    pub volume: u8,
    pub quiet_period: Duration,
    pub browsing_hold: Duration,
    pub placeholder: String,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            play_mode: PlayMode::default(),
            volume: 80,
            quiet_period: DEFAULT_QUIET_PERIOD,
            browsing_hold: DEFAULT_BROWSING_HOLD,
            placeholder: "No lyrics".to_string(),
        }
    }
}

pub struct Player<M, F, V> {
    media: M,
    fetcher: F,
    view: V,
    queue: Queue,
    state: PlaybackState,
    generation: u64,
    pending: Option<PendingSwitch>,
    lyrics: LyricSync,
    seek: SeekController,
    browsing: BrowsingFlag,
    rng: StdRng,
    placeholder: String,
    volume: u8,
    /// The current source failed to load; playing it again reloads it.
    failed: bool,
}

impl<M, F, V> Player<M, F, V>
where
    M: MediaResource,
    F: LyricFetcher,
    V: RenderSink + LineMetrics,
{
    pub fn new(mut media: M, fetcher: F, mut view: V, options: PlayerOptions) -> Self {
        let volume = options.volume.min(100);
        media.set_volume(f32::from(volume) / 100.0);
        view.set_play_mode(options.play_mode);
        view.set_play_icon(PlayIcon::Paused);

        Self {
            media,
            fetcher,
            view,
            queue: Queue::default(),
            state: PlaybackState {
                play_mode: options.play_mode,
                ..PlaybackState::default()
            },
            generation: 0,
            pending: None,
            lyrics: LyricSync::new(options.quiet_period),
            seek: SeekController::default(),
            browsing: BrowsingFlag::new(options.browsing_hold),
            rng: StdRng::from_os_rng(),
            placeholder: options.placeholder,
            volume,
            failed: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn seed_shuffle(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.state.current_index.and_then(|i| self.queue.get(i))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn lyrics(&self) -> &LyricSync {
        &self.lyrics
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn current_time(&self) -> f64 {
        self.media.current_time()
    }

    pub fn duration(&self) -> Option<f64> {
        self.media.duration()
    }

    pub fn is_browsing(&self, now: Instant) -> bool {
        self.browsing.is_active(now)
    }

    /// Replace the queue. The current track keeps playing if the new queue
    /// contains it (matched by id); otherwise playback stops.
    pub fn set_queue(&mut self, name: impl Into<String>, tracks: Vec<Track>) {
        let playing_id = self.current_track().map(|t| t.id);
        self.queue = Queue::new(name, tracks);
        self.view.set_queue_title(&self.queue.name);
        info!(queue = %self.queue.name, len = self.queue.len(), "queue replaced");

        let Some(id) = playing_id else {
            return;
        };
        match self.queue.tracks.iter().position(|t| t.id == id) {
            Some(index) => {
                self.state.current_index = Some(index);
                self.view.set_highlighted_track(Some(index));
            }
            None => {
                self.stop();
                self.state.current_index = None;
                self.lyrics.reset(&mut self.view);
                self.view.set_highlighted_track(None);
                self.view.set_track_meta(None);
                self.view.set_progress_fill(0.0);
            }
        }
    }

    /// Switch to queue position `index` and start loading it. Out-of-range
    /// indices are ignored.
    pub fn select_track(&mut self, index: usize) {
        let Some(track) = self.queue.get(index).cloned() else {
            debug!(index, len = self.queue.len(), "track selection out of range");
            return;
        };

        if self.state.is_playing {
            self.media.pause();
            self.state.is_playing = false;
        }

        self.generation += 1;
        let generation = self.generation;
        self.seek.cancel();
        self.failed = false;
        self.state.current_index = Some(index);
        self.state.phase = Phase::Loading;

        self.view.set_track_meta(Some(&track));
        self.view.set_highlighted_track(Some(index));
        self.view.set_play_icon(PlayIcon::Paused);
        self.view.set_progress_fill(0.0);
        self.lyrics.reset(&mut self.view);

        self.media.set_source(&track, generation);
        self.fetcher.request(generation, &track);
        self.pending = Some(PendingSwitch {
            generation,
            media_ready: false,
            lyrics: LyricsStage::Fetching,
            autoplay: true,
        });
        info!(index, title = %track.title, generation, "track selected");
    }

    /// Selection made from the track list: hold autoscroll while the user browses.
    pub fn select_from_list(&mut self, index: usize, now: Instant) {
        self.browsing.set(now);
        self.select_track(index);
    }

    pub fn play(&mut self) {
        match self.state.phase {
            Phase::Idle => self.start_or_restart(),
            Phase::Loading => self.set_autoplay(true),
            Phase::Paused => self.resume(),
            Phase::Playing => {}
        }
    }

    pub fn pause(&mut self) {
        match self.state.phase {
            Phase::Playing => {
                // A pending seek would otherwise resume the media behind us.
                self.seek.cancel();
                self.media.pause();
                self.state.is_playing = false;
                self.state.phase = Phase::Paused;
                self.view.set_play_icon(PlayIcon::Paused);
            }
            Phase::Loading => self.set_autoplay(false),
            Phase::Idle | Phase::Paused => {}
        }
    }

    pub fn toggle_play(&mut self) {
        match self.state.phase {
            Phase::Playing => self.pause(),
            Phase::Loading => {
                let autoplay = self.pending.as_ref().is_some_and(|p| p.autoplay);
                self.set_autoplay(!autoplay);
            }
            Phase::Idle | Phase::Paused => self.play(),
        }
    }

    /// Stop playback, keeping the current index. Supersedes any pending switch.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.seek.cancel();
        self.media.pause();
        self.state.is_playing = false;
        self.state.phase = Phase::Idle;
        self.view.set_play_icon(PlayIcon::Paused);
        info!("playback stopped");
    }

    pub fn play_next(&mut self) {
        self.advance(Direction::Next);
    }

    pub fn play_previous(&mut self) {
        self.advance(Direction::Previous);
    }

    pub fn set_play_mode(&mut self, mode: PlayMode) {
        self.state.play_mode = mode;
        self.view.set_play_mode(mode);
        info!(mode = mode.label(), "play mode changed");
    }

    pub fn cycle_play_mode(&mut self) -> PlayMode {
        let mode = self.state.play_mode.cycle();
        self.set_play_mode(mode);
        mode
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        self.media.set_volume(f32::from(self.volume) / 100.0);
    }

    /// Change the volume by `delta` percent, saturating at 0 and 100.
    pub fn adjust_volume(&mut self, delta: i16) -> u8 {
        let next = (i16::from(self.volume) + delta).clamp(0, 100);
        self.set_volume(next as u8);
        self.volume
    }

    pub fn seek_pointer(
        &mut self,
        pointer_x: f64,
        geometry: &ProgressGeometry,
        now: Instant,
    ) -> SeekOutcome {
        self.seek
            .seek(&mut self.media, pointer_x, geometry, self.generation, now)
    }

    pub fn seek_to(&mut self, seconds: f64, now: Instant) -> SeekOutcome {
        self.seek
            .seek_to(&mut self.media, seconds, self.generation, now)
    }

    pub fn seek_by(&mut self, delta_seconds: f64, now: Instant) -> SeekOutcome {
        let target = self.media.current_time() + delta_seconds;
        self.seek_to(target, now)
    }

    pub fn on_media_event(&mut self, event: MediaEvent, now: Instant) {
        if event.generation() != self.generation {
            trace!(
                event_generation = event.generation(),
                generation = self.generation,
                "stale media event dropped"
            );
            return;
        }

        match event {
            MediaEvent::Ready { duration, .. } => {
                debug!(?duration, "media ready");
                self.seek.on_ready(&mut self.media, self.generation);
                if let Some(pending) = self.pending.as_mut() {
                    pending.media_ready = true;
                }
                self.try_start();
            }
            MediaEvent::TimeUpdate { time, .. } => {
                if let Some(duration) = self.media.duration().filter(|d| *d > 0.0) {
                    self.view.set_progress_fill((time / duration).clamp(0.0, 1.0));
                }
                if self.lyrics_settled() {
                    let browsing = self.browsing.is_active(now);
                    self.lyrics.sync(time, now, browsing, &mut self.view);
                }
            }
            MediaEvent::Ended { .. } => {
                debug!("track ended");
                self.advance(Direction::Next);
            }
            MediaEvent::Failed { reason, .. } => {
                warn!(%reason, "playback failed");
                let fetching = self
                    .pending
                    .take()
                    .is_some_and(|p| p.lyrics == LyricsStage::Fetching);
                if fetching {
                    let lines = vec![LyricLine::placeholder(&self.placeholder)];
                    self.lyrics.load(lines, &mut self.view);
                }
                self.failed = true;
                self.seek.cancel();
                self.media.pause();
                self.state.is_playing = false;
                self.state.phase = Phase::Paused;
                self.view.set_play_icon(PlayIcon::Paused);
            }
        }
    }

    pub fn on_lyrics(&mut self, reply: LyricReply) {
        let Some(pending) = self
            .pending
            .as_mut()
            .filter(|p| p.generation == reply.generation)
        else {
            trace!(
                reply_generation = reply.generation,
                generation = self.generation,
                "stale lyrics dropped"
            );
            return;
        };
        if pending.lyrics != LyricsStage::Fetching {
            return;
        }
        pending.lyrics = LyricsStage::Settling {
            frames_left: SETTLE_FRAMES,
        };

        let lines = lines_from_result(reply.result, &self.placeholder);
        debug!(track = %reply.track_id, lines = lines.len(), "lyrics loaded");
        self.lyrics.load(lines, &mut self.view);
    }

    /// The view finished drawing a frame.
    pub fn on_frame_rendered(&mut self, now: Instant) {
        let settled = match self.pending.as_mut() {
            Some(pending) => match pending.lyrics {
                LyricsStage::Settling { frames_left } => {
                    let frames_left = frames_left.saturating_sub(1);
                    pending.lyrics = if frames_left == 0 {
                        LyricsStage::Settled
                    } else {
                        LyricsStage::Settling { frames_left }
                    };
                    frames_left == 0
                }
                LyricsStage::Fetching | LyricsStage::Settled => false,
            },
            None => false,
        };

        if settled {
            self.lyrics.clear_highlight(&mut self.view);
            let browsing = self.browsing.is_active(now);
            let time = self.media.current_time();
            self.lyrics.sync(time, now, browsing, &mut self.view);
            self.try_start();
        }
    }

    pub fn on_user_scroll(&mut self, delta: f64, now: Instant) {
        self.lyrics.on_user_scroll(delta, now, &mut self.view);
    }

    /// A click inside the lyric pane ends browsing immediately.
    pub fn on_lyric_click(&mut self) {
        self.browsing.clear();
    }

    pub fn toggle_autoscroll(&mut self) -> bool {
        let enabled = self.lyrics.toggle_autoscroll();
        info!(enabled, "lyric autoscroll toggled");
        enabled
    }

    /// Fire elapsed deadlines.
    pub fn tick(&mut self, now: Instant) {
        self.seek.poll(&mut self.media, self.generation, now);
        self.lyrics.tick(now);
        self.browsing.expire(now);
    }

    fn lyrics_settled(&self) -> bool {
        self.pending
            .as_ref()
            .is_none_or(|p| p.lyrics == LyricsStage::Settled)
    }

    fn set_autoplay(&mut self, autoplay: bool) {
        if let Some(pending) = self.pending.as_mut() {
            pending.autoplay = autoplay;
        }
    }

    /// Start playback once the media is ready and the lyrics have settled.
    fn try_start(&mut self) {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| p.media_ready && p.lyrics == LyricsStage::Settled);
        if !ready {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        if pending.autoplay {
            self.media.play();
            self.state.is_playing = true;
            self.state.phase = Phase::Playing;
            self.view.set_play_icon(PlayIcon::Playing);
        } else {
            self.state.phase = Phase::Paused;
            self.view.set_play_icon(PlayIcon::Paused);
        }
        debug!(generation = pending.generation, "track started");
    }

    fn resume(&mut self) {
        if self.state.current_index.is_none() {
            return;
        }
        if self.failed {
            debug!("reloading failed track");
            self.start_or_restart();
            return;
        }
        self.media.play();
        self.state.is_playing = true;
        self.state.phase = Phase::Playing;
        self.view.set_play_icon(PlayIcon::Playing);
    }

    /// From Idle: restart the current track, or begin the queue.
    fn start_or_restart(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let index = self
            .state
            .current_index
            .filter(|i| *i < self.queue.len())
            .unwrap_or(0);
        self.select_track(index);
    }

    fn advance(&mut self, direction: Direction) {
        let len = self.queue.len();
        if len == 0 {
            return;
        }

        let Some(index) = self.state.current_index else {
            let first = match direction {
                Direction::Next => 0,
                Direction::Previous => len - 1,
            };
            self.select_track(first);
            return;
        };

        match resolve(direction, index, self.state.play_mode, len, &mut self.rng) {
            Resolution::Index(next) => self.select_track(next),
            Resolution::Stop => {
                info!("end of queue");
                self.stop();
            }
        }
    }
}
