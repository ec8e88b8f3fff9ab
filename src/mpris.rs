use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::audio::PlayMode;
use crate::library::Track;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.lyra";

#[derive(Clone, Debug, PartialEq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek in microseconds.
    SeekBy(i64),
    /// Absolute position in microseconds.
    SeekTo(i64),
    SetPlayMode(PlayMode),
    /// Percent, `0..=100`.
    SetVolume(u8),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Default)]
struct SharedState {
    status: PlaybackStatus,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<OwnedObjectPath>,
    position_micros: i64,
    play_mode: PlayMode,
    volume: f64,
}

/// MPRIS `LoopStatus` for a play mode. Shuffle wraps like list repeat.
pub fn loop_status_for(mode: PlayMode) -> &'static str {
    match mode {
        PlayMode::Sequential => "None",
        PlayMode::SingleRepeat => "Track",
        PlayMode::ListRepeat | PlayMode::Shuffle => "Playlist",
    }
}

/// Play mode requested by an MPRIS `LoopStatus` write.
pub fn mode_for_loop_status(status: &str) -> Option<PlayMode> {
    match status {
        "None" => Some(PlayMode::Sequential),
        "Track" => Some(PlayMode::SingleRepeat),
        "Playlist" => Some(PlayMode::ListRepeat),
        _ => None,
    }
}

fn secs_to_micros(secs: f64) -> i64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1_000_000.0) as i64
    } else {
        0
    }
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    fn update(&self, apply: impl FnOnce(&mut SharedState)) {
        if let Ok(mut s) = self.state.lock() {
            apply(&mut s);
        }
    }

    pub fn set_status(&self, status: PlaybackStatus) {
        self.update(|s| s.status = status);
    }

    pub fn set_position(&self, seconds: f64) {
        self.update(|s| s.position_micros = secs_to_micros(seconds));
    }

    pub fn set_play_mode(&self, mode: PlayMode) {
        self.update(|s| s.play_mode = mode);
    }

    pub fn set_volume(&self, percent: u8) {
        self.update(|s| s.volume = f64::from(percent.min(100)) / 100.0);
    }

    /// Publish metadata for the track at queue position `index`, or clear it.
    pub fn set_track_metadata(&self, index: Option<usize>, track: Option<&Track>) {
        self.update(|s| match (index, track) {
            (Some(i), Some(t)) => {
                s.title = Some(t.title.clone());
                s.artist = t.artist.iter().cloned().collect();
                s.album = t.album.clone();
                s.url = Some(format!("file://{}", t.path.display()));
                s.length_micros = t.duration.map(|d| d.as_micros() as i64);
                s.track_id =
                    OwnedObjectPath::try_from(format!("{OBJECT_PATH}/track/{}", i)).ok();
            }
            _ => {
                s.title = None;
                s.artist.clear();
                s.album = None;
                s.url = None;
                s.length_micros = None;
                s.track_id = None;
                s.position_micros = 0;
            }
        });
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "lyra"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn send(&self, cmd: ControlCmd) {
        if self.tx.send(cmd).is_err() {
            debug!("MPRIS command dropped: player loop has exited");
        }
    }

    fn read<T>(&self, f: impl FnOnce(&SharedState) -> T) -> Option<T> {
        self.state.lock().ok().map(|s| f(&s))
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.send(ControlCmd::Next);
    }

    fn previous(&self) {
        self.send(ControlCmd::Prev);
    }

    fn play(&self) {
        self.send(ControlCmd::Play);
    }

    fn pause(&self) {
        self.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        self.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        self.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        self.send(ControlCmd::SeekBy(offset));
    }

    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        // Requests for a track that is no longer current are ignored.
        let current = self
            .read(|s| s.track_id.as_ref().map(|p| p.as_str() == track_id.as_str()))
            .flatten()
            .unwrap_or(false);
        if current {
            self.send(ControlCmd::SeekTo(position));
        }
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        match self.read(|s| s.status).unwrap_or_default() {
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn loop_status(&self) -> &str {
        loop_status_for(self.read(|s| s.play_mode).unwrap_or_default())
    }

    #[zbus(property)]
    fn set_loop_status(&mut self, value: String) {
        match mode_for_loop_status(&value) {
            Some(mode) => self.send(ControlCmd::SetPlayMode(mode)),
            None => warn!(%value, "unknown MPRIS loop status"),
        }
    }

    #[zbus(property)]
    fn shuffle(&self) -> bool {
        self.read(|s| s.play_mode == PlayMode::Shuffle)
            .unwrap_or(false)
    }

    #[zbus(property)]
    fn set_shuffle(&mut self, value: bool) {
        let shuffling = self.shuffle();
        if value && !shuffling {
            self.send(ControlCmd::SetPlayMode(PlayMode::Shuffle));
        } else if !value && shuffling {
            self.send(ControlCmd::SetPlayMode(PlayMode::ListRepeat));
        }
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.read(|s| s.volume).unwrap_or(0.0)
    }

    #[zbus(property)]
    fn set_volume(&mut self, value: f64) {
        let percent = (value.clamp(0.0, 1.0) * 100.0).round() as u8;
        self.send(ControlCmd::SetVolume(percent));
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.read(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut insert = |key: &str, value: Value<'_>| {
            if let Ok(v) = OwnedValue::try_from(value) {
                map.insert(key.to_string(), v);
            }
        };

        if let Some(id) = &s.track_id {
            insert("mpris:trackid", Value::from(id.clone().into_inner()));
        }
        if let Some(title) = &s.title {
            insert("xesam:title", Value::from(title.clone()));
        }
        if !s.artist.is_empty() {
            insert("xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(album) = &s.album {
            insert("xesam:album", Value::from(album.clone()));
        }
        if let Some(url) = &s.url {
            insert("xesam:url", Value::from(url.clone()));
        }
        if let Some(length) = s.length_micros {
            insert("mpris:length", Value::from(length));
        }
        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState {
        volume: 1.0,
        ..SharedState::default()
    }));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                warn!(error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server
                .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                .await
            {
                warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }

            // Keep the service alive.
            loop {
                Timer::after(std::time::Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}
