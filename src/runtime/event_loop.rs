use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;

use crate::app::App;
use crate::audio::{AudioPlayer, MediaEvent};
use crate::config;
use crate::lyrics::{LyricReply, ThreadedFetcher};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{MprisSnapshot, update_mpris};
use crate::runtime::settings::persist;
use crate::ui::{self, View};

pub type LyraApp = App<AudioPlayer, ThreadedFetcher, View>;

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Receiving ends of every message source the loop drains.
pub struct Channels {
    pub media: Receiver<MediaEvent>,
    pub lyrics: Receiver<LyricReply>,
    pub control_tx: Sender<ControlCmd>,
    pub control_rx: Receiver<ControlCmd>,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Keep the list cursor on the playing track.
    pub follow: bool,
    /// A left-button press landed on the gauge and has not been released.
    dragging_gauge: bool,
    last_mpris: MprisSnapshot,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings) -> Self {
        Self {
            follow: settings.ui.follow_playback,
            ..Self::default()
        }
    }
}

/// Main terminal event loop: drains player messages, fires deadlines,
/// draws, and handles input. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &mut config::Settings,
    app: &mut LyraApp,
    mpris: &MprisHandle,
    channels: &Channels,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now = Instant::now();
        while let Ok(ev) = channels.media.try_recv() {
            app.player.on_media_event(ev, now);
        }
        while let Ok(reply) = channels.lyrics.try_recv() {
            app.player.on_lyrics(reply);
        }
        while let Ok(cmd) = channels.control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, state, now) {
                return Ok(());
            }
        }
        app.player.tick(now);

        if state.follow && settings.ui.follow_playback {
            app.follow_playing();
        }
        update_mpris(mpris, app, &mut state.last_mpris);

        terminal.draw(|f| ui::draw(f, app, settings))?;
        app.player.on_frame_rendered(Instant::now());

        if event::poll(Duration::from_millis(50))? {
            let quit = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key_event(key, settings, app, &channels.control_tx, state)
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(mouse, settings, app, state);
                    false
                }
                _ => false,
            };
            if quit {
                quit_softly(app, settings);
                return Ok(());
            }
        }
    }
}

fn quit_softly(app: &LyraApp, settings: &config::Settings) {
    app.player
        .media()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
}

fn save_play_mode(settings: &mut config::Settings, app: &LyraApp) {
    settings.playback.play_mode = app.player.state().play_mode.into();
    persist(settings);
}

fn save_volume(settings: &mut config::Settings, app: &LyraApp) {
    settings.playback.volume = app.player.volume();
    persist(settings);
}

/// Apply a transport command from the keyboard or MPRIS. Returns `true` on quit.
fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &mut config::Settings,
    app: &mut LyraApp,
    state: &mut EventLoopState,
    now: Instant,
) -> bool {
    match cmd {
        ControlCmd::Quit => {
            quit_softly(app, settings);
            return true;
        }
        ControlCmd::Play => {
            state.follow = true;
            app.player.play();
        }
        ControlCmd::Pause => app.player.pause(),
        ControlCmd::PlayPause => {
            state.follow = true;
            app.player.toggle_play();
        }
        ControlCmd::Stop => app.player.stop(),
        ControlCmd::Next => {
            state.follow = true;
            app.player.play_next();
        }
        ControlCmd::Prev => {
            state.follow = true;
            app.player.play_previous();
        }
        ControlCmd::SeekBy(micros) => {
            app.player.seek_by(micros as f64 / MICROS_PER_SEC, now);
        }
        ControlCmd::SeekTo(micros) => {
            app.player.seek_to(micros as f64 / MICROS_PER_SEC, now);
        }
        ControlCmd::SetPlayMode(mode) => {
            app.player.set_play_mode(mode);
            save_play_mode(settings, app);
        }
        ControlCmd::SetVolume(percent) => {
            app.player.set_volume(percent);
            save_volume(settings, app);
        }
    }
    false
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &mut config::Settings,
    app: &mut LyraApp,
    control_tx: &Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> bool {
    let now = Instant::now();
    let send = |cmd: ControlCmd| {
        if control_tx.send(cmd).is_err() {
            warn!("control channel closed");
        }
    };

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            state.follow = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.follow = false;
            app.prev();
        }
        KeyCode::Enter => {
            state.follow = true;
            app.play_selected(now);
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => send(ControlCmd::PlayPause),
        KeyCode::Char('l') => send(ControlCmd::Next),
        KeyCode::Char('h') => send(ControlCmd::Prev),
        KeyCode::Char('L') => {
            app.player.seek_by(settings.controls.scrub_seconds as f64, now);
        }
        KeyCode::Char('H') => {
            app.player.seek_by(-(settings.controls.scrub_seconds as f64), now);
        }
        KeyCode::Char('m') => {
            app.player.cycle_play_mode();
            save_play_mode(settings, app);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.player.adjust_volume(i16::from(settings.controls.volume_step));
            save_volume(settings, app);
        }
        KeyCode::Char('-') => {
            app.player.adjust_volume(-i16::from(settings.controls.volume_step));
            save_volume(settings, app);
        }
        KeyCode::Char('a') => {
            app.player.toggle_autoscroll();
        }
        KeyCode::Char('P') => {
            if let Err(e) = app.cycle_playlist() {
                warn!(error = %e, "cannot switch playlist");
            }
        }
        KeyCode::Char('e') => {
            app.cycle_effect();
        }
        _ => {}
    }
    false
}

fn handle_mouse_event(
    mouse: MouseEvent,
    settings: &config::Settings,
    app: &mut LyraApp,
    state: &mut EventLoopState,
) {
    let now = Instant::now();
    let (column, row) = (mouse.column, mouse.row);
    let view = app.player.view();
    let wheel = f64::from(settings.lyrics.wheel_rows);

    match mouse.kind {
        MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
            let down = mouse.kind == MouseEventKind::ScrollDown;
            if view.in_lyrics(column, row) {
                app.player.on_user_scroll(if down { wheel } else { -wheel }, now);
            } else if view.in_list(column, row) {
                state.follow = false;
                if down {
                    app.next();
                } else {
                    app.prev();
                }
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if view.in_gauge(column, row) {
                state.dragging_gauge = true;
                if let Some(geometry) = view.gauge_geometry() {
                    app.player.seek_pointer(f64::from(column), &geometry, now);
                }
            } else if view.in_lyrics(column, row) {
                app.player.on_lyric_click();
            } else if let Some(index) = view.list_index_at(column, row, app.player.queue().len()) {
                // A second click on the selected row plays it.
                if index == app.selected {
                    state.follow = true;
                    app.play_selected(now);
                } else {
                    state.follow = false;
                    app.set_selected(index);
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if state.dragging_gauge => {
            if let Some(geometry) = view.gauge_geometry() {
                app.player.seek_pointer(f64::from(column), &geometry, now);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => state.dragging_gauge = false,
        _ => {}
    }
}
