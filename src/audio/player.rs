use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::library::Track;

use super::resource::MediaResource;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, MediaEvent, PlaybackHandle, PlaybackInfo};

/// `MediaResource` backed by the rodio audio thread.
///
/// Commands go over a channel; time, duration and pause state are read
/// from the snapshot the audio thread publishes.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(events: Sender<MediaEvent>, audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo {
            paused: true,
            ..PlaybackInfo::default()
        }));

        let audio_handle = spawn_audio_thread(rx, events, playback_info.clone(), audio_settings);

        Self {
            tx,
            playback: playback_info,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread has exited; command dropped");
        }
    }

    fn snapshot<T>(&self, read: impl FnOnce(&PlaybackInfo) -> T) -> Option<T> {
        self.playback.lock().ok().map(|info| read(&info))
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl MediaResource for AudioPlayer {
    fn set_source(&mut self, track: &Track, generation: u64) {
        if let Ok(mut info) = self.playback.lock() {
            *info = PlaybackInfo {
                generation,
                elapsed: Duration::ZERO,
                duration: None,
                paused: true,
            };
        }
        self.send(AudioCmd::Load {
            path: track.path.clone(),
            generation,
            duration_hint: track.duration,
        });
    }

    fn play(&mut self) {
        if let Ok(mut info) = self.playback.lock() {
            info.paused = false;
        }
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        if let Ok(mut info) = self.playback.lock() {
            info.paused = true;
        }
        self.send(AudioCmd::Pause);
    }

    fn is_paused(&self) -> bool {
        self.snapshot(|info| info.paused).unwrap_or(true)
    }

    fn current_time(&self) -> f64 {
        self.snapshot(|info| info.elapsed.as_secs_f64())
            .unwrap_or(0.0)
    }

    fn set_current_time(&mut self, seconds: f64) {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.send(AudioCmd::Seek(Duration::from_secs_f64(seconds)));
    }

    fn duration(&self) -> Option<f64> {
        self.snapshot(|info| info.duration.map(|d| d.as_secs_f64()))
            .flatten()
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCmd::SetVolume(volume));
    }
}
