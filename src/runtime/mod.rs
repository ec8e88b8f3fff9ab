use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::{App, Player};
use crate::audio::{AudioPlayer, MediaEvent};
use crate::library::Library;
use crate::lyrics::LyricReply;
use crate::mpris::ControlCmd;
use crate::ui::View;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let mut settings = settings::load_settings();

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"));
    info!(dir = %dir.display(), "starting lyra");

    let library = Library::load(&dir, &settings.library);
    info!(tracks = library.tracks().len(), "library scanned");

    let (media_tx, media_rx) = mpsc::channel::<MediaEvent>();
    let (lyrics_tx, lyrics_rx) = mpsc::channel::<LyricReply>();
    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();

    let audio_player = AudioPlayer::new(media_tx, settings.audio.clone());
    let fetcher = startup::lyric_fetcher(&settings, lyrics_tx);
    let player = Player::new(
        audio_player,
        fetcher,
        View::default(),
        startup::player_options(&settings),
    );
    let mut app = App::new(player, library);

    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    let channels = event_loop::Channels {
        media: media_rx,
        lyrics: lyrics_rx,
        control_tx,
        control_rx,
    };

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::new(&settings);
    let run_result = event_loop::run(
        &mut terminal,
        &mut settings,
        &mut app,
        &mpris,
        &channels,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
