use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, error, info, warn};

use crate::config::AudioSettings;
use crate::error::AudioError;

use super::sink::create_sink_at;
use super::types::{AudioCmd, MediaEvent, PlaybackHandle, PlaybackInfo};

/// The source currently owned by the audio thread.
struct Loaded {
    sink: Sink,
    generation: u64,
    path: PathBuf,
    duration: Option<Duration>,
    /// Start position of a sink rebuilt at a seek target; `get_pos` counts from it.
    offset: Duration,
    ended: bool,
}

fn emit(events: &Sender<MediaEvent>, event: MediaEvent) {
    // The receiver only disappears on shutdown.
    let _ = events.send(event);
}

/// Update the shared snapshot, unless a newer source has been requested since.
fn publish(playback_info: &PlaybackHandle, generation: u64, update: impl FnOnce(&mut PlaybackInfo)) {
    if let Ok(mut info) = playback_info.lock() {
        if info.generation == generation {
            update(&mut info);
        }
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64, volume: f32) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(volume * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

/// Without an output device every load fails, but the player keeps running.
fn reject_loads(rx: &Receiver<AudioCmd>, events: &Sender<MediaEvent>, err: &AudioError) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            AudioCmd::Load { generation, .. } => emit(
                events,
                MediaEvent::Failed {
                    generation,
                    reason: err.to_string(),
                },
            ),
            AudioCmd::Quit { .. } => break,
            _ => {}
        }
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<MediaEvent>,
    playback_info: PlaybackHandle,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let err = AudioError::NoDevice(e.to_string());
                error!(error = %err, "audio output unavailable");
                reject_loads(&rx, &events, &err);
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let tick = Duration::from_millis(audio_settings.progress_interval_ms.max(10));
        let mut current: Option<Loaded> = None;
        let mut paused = true;
        let mut volume: f32 = 1.0;

        loop {
            match rx.recv_timeout(tick) {
                Ok(AudioCmd::Load {
                    path,
                    generation,
                    duration_hint,
                }) => {
                    if let Some(old) = current.take() {
                        old.sink.stop();
                    }
                    paused = true;

                    match create_sink_at(&stream, &path, Duration::ZERO) {
                        Ok((sink, total)) => {
                            sink.set_volume(volume);
                            let duration = total.or(duration_hint);
                            publish(&playback_info, generation, |info| {
                                info.elapsed = Duration::ZERO;
                                info.duration = duration;
                            });
                            info!(path = %path.display(), generation, "source loaded");
                            current = Some(Loaded {
                                sink,
                                generation,
                                path,
                                duration,
                                offset: Duration::ZERO,
                                ended: false,
                            });
                            emit(
                                &events,
                                MediaEvent::Ready {
                                    generation,
                                    duration: duration.map(|d| d.as_secs_f64()),
                                },
                            );
                        }
                        Err(e) => {
                            warn!(error = %e, "cannot load source");
                            emit(
                                &events,
                                MediaEvent::Failed {
                                    generation,
                                    reason: e.to_string(),
                                },
                            );
                        }
                    }
                }

                Ok(AudioCmd::Play) => {
                    if let Some(cur) = current.as_ref() {
                        cur.sink.play();
                        paused = false;
                    }
                }

                Ok(AudioCmd::Pause) => {
                    if let Some(cur) = current.as_ref() {
                        cur.sink.pause();
                    }
                    paused = true;
                }

                Ok(AudioCmd::Seek(target)) => {
                    let Some(cur) = current.as_mut() else {
                        continue;
                    };
                    let target = cur.duration.map_or(target, |d| target.min(d));

                    match cur.sink.try_seek(target) {
                        Ok(()) => {
                            cur.offset = Duration::ZERO;
                        }
                        Err(e) => {
                            // Not every decoder seeks in place: rebuild the sink and
                            // skip into the file instead.
                            debug!(error = %e, "in-place seek failed, reopening at target");
                            match create_sink_at(&stream, &cur.path, target) {
                                Ok((sink, _)) => {
                                    cur.sink.stop();
                                    sink.set_volume(volume);
                                    if !paused {
                                        sink.play();
                                    }
                                    cur.sink = sink;
                                    cur.offset = target;
                                }
                                Err(e) => {
                                    warn!(error = %e, "seek failed");
                                    continue;
                                }
                            }
                        }
                    }
                    cur.ended = false;
                    publish(&playback_info, cur.generation, |info| info.elapsed = target);
                }

                Ok(AudioCmd::SetVolume(v)) => {
                    volume = v.clamp(0.0, 1.0);
                    if let Some(cur) = current.as_ref() {
                        cur.sink.set_volume(volume);
                    }
                }

                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    if let Some(cur) = current.as_ref() {
                        // Fade out gently before stopping.
                        if !paused {
                            fade_out_sink(&cur.sink, fade_out_ms, volume);
                        }
                        cur.sink.stop();
                    }
                    if let Ok(mut info) = playback_info.lock() {
                        info.paused = true;
                    }
                    break;
                }

                Err(RecvTimeoutError::Timeout) => {
                    let Some(cur) = current.as_mut() else {
                        continue;
                    };
                    let elapsed = cur.offset + cur.sink.get_pos();
                    publish(&playback_info, cur.generation, |info| {
                        info.elapsed = elapsed;
                    });
                    if paused || cur.ended {
                        continue;
                    }

                    emit(
                        &events,
                        MediaEvent::TimeUpdate {
                            generation: cur.generation,
                            time: elapsed.as_secs_f64(),
                        },
                    );
                    if cur.sink.empty() {
                        cur.ended = true;
                        emit(
                            &events,
                            MediaEvent::Ended {
                                generation: cur.generation,
                            },
                        );
                    }
                }

                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
