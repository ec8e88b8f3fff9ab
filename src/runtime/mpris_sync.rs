use crate::app::{App, Phase, PlaybackState};
use crate::audio::{MediaResource, PlayMode};
use crate::library::TrackId;
use crate::lyrics::LyricFetcher;
use crate::mpris::{MprisHandle, PlaybackStatus};
use crate::render::{LineMetrics, RenderSink};

/// What was last published to MPRIS, so metadata is rebuilt only on change.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MprisSnapshot {
    index: Option<usize>,
    track: Option<TrackId>,
    status: PlaybackStatus,
    mode: PlayMode,
    volume: u8,
}

pub fn playback_status(state: &PlaybackState) -> PlaybackStatus {
    match state.phase {
        Phase::Idle => PlaybackStatus::Stopped,
        Phase::Playing => PlaybackStatus::Playing,
        Phase::Loading if state.is_playing => PlaybackStatus::Playing,
        Phase::Loading | Phase::Paused => PlaybackStatus::Paused,
    }
}

pub fn update_mpris<M, F, V>(mpris: &MprisHandle, app: &App<M, F, V>, last: &mut MprisSnapshot)
where
    M: MediaResource,
    F: LyricFetcher,
    V: RenderSink + LineMetrics,
{
    let player = &app.player;
    let state = player.state();
    let track = player.current_track();
    let snapshot = MprisSnapshot {
        index: state.current_index,
        track: track.map(|t| t.id),
        status: playback_status(state),
        mode: state.play_mode,
        volume: player.volume(),
    };

    mpris.set_position(player.current_time());
    if snapshot == *last {
        return;
    }

    if (snapshot.index, snapshot.track) != (last.index, last.track) {
        mpris.set_track_metadata(snapshot.index, track);
    }
    mpris.set_status(snapshot.status);
    mpris.set_play_mode(snapshot.mode);
    mpris.set_volume(snapshot.volume);
    *last = snapshot;
}
