//! Terminal rendering with `ratatui`.
//!
//! `draw` lays out the frame, records the regions it used in the `View` for
//! mouse hit-testing, and renders from the state `Player` pushed into it.

mod view;

pub use view::{LYRIC_WRAP, Regions, View};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Instant};

use crate::app::{App, Phase};
use crate::audio::MediaResource;
use crate::config::{ControlsSettings, Settings};
use crate::library::{detail_line, display_name, format_mmss};
use crate::lyrics::LyricFetcher;
use crate::render::PlayIcon;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L and +/- are filled from config.
    map.insert("m", "play mode");
    map.insert("a", "autoscroll");
    map.insert("P", "playlist");
    map.insert("e", "effect");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating the configured steps.
fn controls_text(controls: &ControlsSettings) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "+/-", "m", "a", "P", "e", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] scrub -/+{}s", controls.scrub_seconds)),
            "+/-" => Some(format!("[+/-] volume ±{}%", controls.volume_step)),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn phase_text(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Stopped",
        Phase::Loading => "Loading",
        Phase::Playing => "Playing",
        Phase::Paused => "Paused",
    }
}

/// First row of a `height`-row window that keeps `selected` centered.
fn window_start(selected: usize, total: usize, height: usize) -> usize {
    if total <= height || height == 0 {
        return 0;
    }
    let half = height / 2;
    selected.saturating_sub(half).min(total - height)
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into `frame` and refresh the view's hit regions.
pub fn draw<M, F>(frame: &mut Frame, app: &mut App<M, F, View>, settings: &Settings)
where
    M: MediaResource,
    F: LyricFetcher,
{
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);

    let list_block = Block::default().borders(Borders::ALL).title(" tracks ");
    let list_inner = list_block.inner(body[0]);
    let lyric_title = match app.player.view().track() {
        Some(track) => format!(" {} ", display_name(track, &settings.display)),
        None => " lyrics ".to_string(),
    };
    let lyric_block = padded(&lyric_title);
    let lyric_inner = lyric_block.inner(body[1]);
    let gauge_block = Block::default().borders(Borders::ALL);
    let gauge_inner = gauge_block.inner(chunks[3]);

    let total = app.player.queue().len();
    let list_start = window_start(app.selected, total, usize::from(list_inner.height));
    app.player.view_mut().set_regions(Regions {
        list: list_inner,
        list_start,
        lyrics: lyric_inner,
        gauge: gauge_inner,
    });

    let now = Instant::now();
    let view = app.player.view();
    let state = app.player.state();

    // Header
    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" lyra ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status line
    let status = {
        let mut parts: Vec<String> = Vec::new();
        parts.push(phase_text(state.phase).to_string());
        parts.push(format!("MODE: {}", view.play_mode().label()));
        parts.push(format!("VOL: {}%", app.player.volume()));
        parts.push(format!("EFFECT: {}", app.effect.label()));
        let playlists = app.library.playlists();
        let position = playlists
            .iter()
            .position(|(id, _)| *id == app.playlist)
            .unwrap_or(0);
        parts.push(format!(
            "QUEUE: {} [{}/{}]",
            view.queue_title(),
            position + 1,
            playlists.len()
        ));
        if !app.player.lyrics().autoscroll_enabled() {
            parts.push("AUTOSCROLL: off".to_string());
        } else if app.player.is_browsing(now) || app.player.lyrics().is_user_scrolling(now) {
            parts.push("AUTOSCROLL: held".to_string());
        }
        parts.join(" • ")
    };
    frame.render_widget(
        Paragraph::new(status).block(padded(" status ")),
        chunks[1],
    );

    // Track list
    let end = (list_start + usize::from(list_inner.height)).min(total);
    let dim = Style::default().fg(Color::DarkGray);
    let items: Vec<ListItem> = (list_start..end)
        .filter_map(|i| app.player.queue().get(i).map(|t| (i, t)))
        .map(|(i, track)| {
            let marker = if view.highlighted_track() == Some(i) { "♪ " } else { "  " };
            let mut spans = vec![
                Span::raw(marker),
                Span::raw(display_name(track, &settings.display)),
            ];
            let details = detail_line(track, &settings.display);
            if !details.is_empty() {
                spans.push(Span::styled(format!("  {details}"), dim));
            }
            if let Some(d) = track.duration {
                spans.push(Span::styled(format!("  {}", format_mmss(d.as_secs_f64())), dim));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    let list = List::new(items)
        .block(list_block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut list_state = ListState::default();
    if total > 0 {
        list_state.select(Some(app.selected.saturating_sub(list_start)));
    }
    frame.render_stateful_widget(list, body[0], &mut list_state);

    // Lyrics
    let lines: Vec<Line> = view
        .lines()
        .iter()
        .enumerate()
        .map(|(i, text)| {
            if view.active_line() == Some(i) {
                Line::from(text.as_str()).bold().fg(Color::Yellow)
            } else {
                Line::from(text.as_str()).fg(Color::Gray)
            }
        })
        .collect();
    let offset = view.scroll_offset().max(0.0).round() as u16;
    let lyrics = Paragraph::new(lines)
        .block(lyric_block)
        .wrap(LYRIC_WRAP)
        .scroll((offset, 0));
    frame.render_widget(lyrics, body[1]);

    // Progress
    let elapsed = app.player.current_time();
    let total_time = app
        .player
        .duration()
        .map(format_mmss)
        .unwrap_or_else(|| "-:--".to_string());
    let icon = match view.play_icon() {
        PlayIcon::Playing => " ▶ ",
        PlayIcon::Paused => " ⏸ ",
    };
    let gauge = Gauge::default()
        .block(gauge_block.title(icon))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(view.progress().clamp(0.0, 1.0))
        .label(format!("{} / {}", format_mmss(elapsed), total_time));
    frame.render_widget(gauge, chunks[3]);

    // Footer
    let footer = Paragraph::new(controls_text(&settings.controls))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
