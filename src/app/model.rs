//! Application model: the `Player` plus the state that only the terminal
//! front end cares about (list cursor, loaded playlist, effect label).

use std::time::Instant;

use tracing::{info, warn};

use crate::audio::MediaResource;
use crate::error::LibraryError;
use crate::library::{Library, PlaylistId};
use crate::lyrics::LyricFetcher;
use crate::render::{LineMetrics, RenderSink};

use super::player::Player;

/// Sound effect presets. Only the label is shown; no processing is applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    Original,
    SuperBass,
    PureVocals,
    HiFiLive,
    Vinyl,
    Concert,
    Surround3d,
    Spatial,
}

impl Effect {
    const ALL: [Effect; 8] = [
        Effect::Original,
        Effect::SuperBass,
        Effect::PureVocals,
        Effect::HiFiLive,
        Effect::Vinyl,
        Effect::Concert,
        Effect::Surround3d,
        Effect::Spatial,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Effect::Original => "Original",
            Effect::SuperBass => "Super bass",
            Effect::PureVocals => "Pure vocals",
            Effect::HiFiLive => "HiFi live",
            Effect::Vinyl => "Vinyl",
            Effect::Concert => "Concert",
            Effect::Surround3d => "3D surround",
            Effect::Spatial => "Spatial",
        }
    }

    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|e| *e == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

pub struct App<M, F, V> {
    pub player: Player<M, F, V>,
    pub library: Library,
    /// Cursor position in the current queue.
    pub selected: usize,
    pub playlist: PlaylistId,
    pub effect: Effect,
}

impl<M, F, V> App<M, F, V>
where
    M: MediaResource,
    F: LyricFetcher,
    V: RenderSink + LineMetrics,
{
    /// Create an `App` with "All music" loaded as the queue.
    pub fn new(player: Player<M, F, V>, library: Library) -> Self {
        let mut app = Self {
            player,
            library,
            selected: 0,
            playlist: PlaylistId::All,
            effect: Effect::default(),
        };
        if let Err(e) = app.load_playlist(PlaylistId::All) {
            warn!(error = %e, "cannot load library queue");
        }
        app
    }

    pub fn has_tracks(&self) -> bool {
        !self.player.queue().is_empty()
    }

    /// Move the cursor down, wrapping at the end.
    pub fn next(&mut self) {
        let len = self.player.queue().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the cursor up, wrapping at the top.
    pub fn prev(&mut self) {
        let len = self.player.queue().len();
        if len > 0 {
            self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
        }
    }

    pub fn set_selected(&mut self, index: usize) {
        if index < self.player.queue().len() {
            self.selected = index;
        }
    }

    pub fn play_selected(&mut self, now: Instant) {
        if self.has_tracks() {
            self.player.select_from_list(self.selected, now);
        }
    }

    /// Keep the cursor on the playing track after an automatic advance.
    pub fn follow_playing(&mut self) {
        if let Some(index) = self.player.state().current_index {
            self.selected = index;
        }
    }

    /// Load a playlist as the queue. On error the current queue is untouched.
    pub fn load_playlist(&mut self, id: PlaylistId) -> Result<(), LibraryError> {
        let playlist = self.library.playlist(&id)?;
        info!(playlist = %playlist.name, "playlist loaded");
        self.player.set_queue(playlist.name, playlist.tracks);
        self.playlist = id;
        self.selected = self.player.state().current_index.unwrap_or(0);
        Ok(())
    }

    pub fn cycle_playlist(&mut self) -> Result<(), LibraryError> {
        let next = self.library.next_playlist_id(&self.playlist);
        self.load_playlist(next)
    }

    pub fn cycle_effect(&mut self) -> Effect {
        self.effect = self.effect.next();
        info!(effect = self.effect.label(), "effect preset selected");
        self.effect
    }
}
