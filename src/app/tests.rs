use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::*;
use crate::audio::{MediaEvent, PlayMode};
use crate::library::{Library, PlaylistId, TrackId};
use crate::lyrics::LyricReply;
use crate::render::PlayIcon;
use crate::seek::{ProgressGeometry, SeekOutcome};
use crate::testing::{
    FakeMedia, RecordingFetcher, RecordingSink, SinkCall, track, tracks,
};

type TestPlayer = Player<FakeMedia, RecordingFetcher, RecordingSink>;

/// Ten lines, one every ten seconds.
const LRC: &str = "[00:00.00]zero\n[00:10.00]one\n[00:20.00]two\n[00:30.00]three\n\
[00:40.00]four\n[00:50.00]five\n[01:00.00]six\n[01:10.00]seven\n[01:20.00]eight\n[01:30.00]nine\n";

fn player(n: u32) -> TestPlayer {
    let mut p = Player::new(
        FakeMedia::default(),
        RecordingFetcher::default(),
        RecordingSink::default(),
        PlayerOptions::default(),
    );
    p.set_queue("All music", tracks(n));
    p.seed_shuffle(11);
    p
}

fn reply(generation: u64, id: TrackId, text: Option<&str>) -> LyricReply {
    LyricReply {
        generation,
        track_id: id,
        result: Ok(text.map(str::to_string)),
    }
}

fn ready(p: &mut TestPlayer, duration: f64, now: Instant) {
    let generation = p.generation();
    p.media_mut().duration = Some(duration);
    p.on_media_event(
        MediaEvent::Ready {
            generation,
            duration: Some(duration),
        },
        now,
    );
}

fn deliver_lyrics(p: &mut TestPlayer, text: Option<&str>) {
    let generation = p.generation();
    let id = p.current_track().map(|t| t.id).unwrap();
    p.on_lyrics(reply(generation, id, text));
}

/// Complete the pending switch: media ready, lyrics in, two frames drawn.
fn finish_switch(p: &mut TestPlayer, text: Option<&str>, now: Instant) {
    ready(p, 200.0, now);
    deliver_lyrics(p, text);
    p.on_frame_rendered(now);
    p.on_frame_rendered(now);
}

fn time_update(p: &mut TestPlayer, time: f64, now: Instant) {
    let generation = p.generation();
    p.media_mut().time = time;
    p.on_media_event(MediaEvent::TimeUpdate { generation, time }, now);
}

#[test]
fn out_of_range_selection_is_ignored() {
    let mut p = player(3);
    p.select_track(9);
    assert_eq!(p.generation(), 0);
    assert_eq!(p.state().phase, Phase::Idle);
    assert!(p.fetcher().requests.borrow().is_empty());
}

#[test]
fn playback_waits_for_ready_and_two_settled_frames() {
    let now = Instant::now();
    let mut p = player(3);

    p.select_track(0);
    assert_eq!(p.state().phase, Phase::Loading);
    assert_eq!(p.state().current_index, Some(0));
    assert_eq!(p.media().source, Some((TrackId(1), 1)));
    assert_eq!(*p.fetcher().requests.borrow(), vec![(1, TrackId(1))]);
    assert!(p.view().calls.contains(&SinkCall::TrackMeta(Some(TrackId(1)))));

    ready(&mut p, 200.0, now);
    assert_eq!(p.state().phase, Phase::Loading);
    deliver_lyrics(&mut p, Some(LRC));
    assert_eq!(p.state().phase, Phase::Loading);
    p.on_frame_rendered(now);
    assert_eq!(p.state().phase, Phase::Loading);
    assert!(!p.media().playing);

    p.on_frame_rendered(now);
    assert_eq!(p.state().phase, Phase::Playing);
    assert!(p.state().is_playing);
    assert!(p.media().playing);
    assert_eq!(p.lyrics().current(), Some(0));
    assert!(p.view().calls.contains(&SinkCall::PlayIcon(PlayIcon::Playing)));
}

#[test]
fn lyrics_arriving_before_ready_still_start_playback() {
    let now = Instant::now();
    let mut p = player(3);
    p.select_track(1);

    deliver_lyrics(&mut p, None);
    p.on_frame_rendered(now);
    p.on_frame_rendered(now);
    assert_eq!(p.state().phase, Phase::Loading);
    // Missing lyrics show the placeholder line.
    assert_eq!(p.lyrics().lines().len(), 1);

    ready(&mut p, 120.0, now);
    assert_eq!(p.state().phase, Phase::Playing);
}

#[test]
fn lyrics_from_a_superseded_switch_are_dropped() {
    let now = Instant::now();
    let mut p = player(3);

    p.select_track(0);
    p.select_track(1);
    p.on_lyrics(reply(1, TrackId(1), Some("[00:01.00]stale")));
    assert!(p.lyrics().lines().is_empty());
    assert_eq!(p.view().line_count, 0);

    p.on_lyrics(reply(2, TrackId(2), Some("[00:01.00]fresh\n[00:02.00]lines")));
    assert_eq!(p.lyrics().lines().len(), 2);
    assert_eq!(p.media().source, Some((TrackId(2), 2)));

    p.on_frame_rendered(now);
    p.on_frame_rendered(now);
    ready(&mut p, 90.0, now);
    assert_eq!(p.state().current_index, Some(1));
    assert_eq!(p.state().phase, Phase::Playing);
}

#[test]
fn media_events_from_an_old_source_are_ignored() {
    let now = Instant::now();
    let mut p = player(3);
    p.select_track(0);
    p.select_track(1);

    p.on_media_event(MediaEvent::Ended { generation: 1 }, now);
    p.on_media_event(
        MediaEvent::Ready {
            generation: 1,
            duration: Some(10.0),
        },
        now,
    );
    deliver_lyrics(&mut p, None);
    p.on_frame_rendered(now);
    p.on_frame_rendered(now);

    assert_eq!(p.state().current_index, Some(1));
    assert_eq!(p.state().phase, Phase::Loading);
}

#[test]
fn switching_tracks_clears_the_old_highlight_first() {
    let now = Instant::now();
    let mut p = player(3);
    p.select_track(0);
    finish_switch(&mut p, Some(LRC), now);
    time_update(&mut p, 15.0, now);
    assert_eq!(p.lyrics().current(), Some(1));

    p.select_track(1);
    assert_eq!(p.view().last_active_line(), Some(None));
    assert_eq!(p.lyrics().current(), None);
    assert!(p.lyrics().lines().is_empty());
}

#[test]
fn list_repeat_wraps_to_the_first_track_when_the_last_ends() {
    let now = Instant::now();
    let mut p = player(3);
    p.select_track(2);
    finish_switch(&mut p, None, now);

    let generation = p.generation();
    p.on_media_event(MediaEvent::Ended { generation }, now);
    assert_eq!(p.state().current_index, Some(0));
    assert_eq!(p.state().phase, Phase::Loading);
    assert_eq!(p.generation(), generation + 1);
    assert_eq!(p.media().source, Some((TrackId(1), generation + 1)));
}

#[test]
fn sequential_stops_after_the_last_track_and_keeps_it_selected() {
    let now = Instant::now();
    let mut p = player(3);
    p.set_play_mode(PlayMode::Sequential);
    p.select_track(2);
    finish_switch(&mut p, None, now);

    let generation = p.generation();
    p.on_media_event(MediaEvent::Ended { generation }, now);
    assert_eq!(p.state().phase, Phase::Idle);
    assert_eq!(p.state().current_index, Some(2));
    assert!(!p.state().is_playing);
    assert!(!p.media().playing);

    // Play from idle restarts the same track.
    p.toggle_play();
    assert_eq!(p.state().phase, Phase::Loading);
    assert_eq!(p.state().current_index, Some(2));
}

#[test]
fn single_repeat_reloads_the_current_track() {
    let now = Instant::now();
    let mut p = player(3);
    p.set_play_mode(PlayMode::SingleRepeat);
    p.select_track(1);
    finish_switch(&mut p, None, now);

    p.play_previous();
    assert_eq!(p.state().current_index, Some(1));
    assert_eq!(p.state().phase, Phase::Loading);

    finish_switch(&mut p, None, now);
    let generation = p.generation();
    p.on_media_event(MediaEvent::Ended { generation }, now);
    assert_eq!(p.state().current_index, Some(1));
}

#[test]
fn shuffle_always_lands_inside_the_queue() {
    let now = Instant::now();
    let mut p = player(4);
    p.set_play_mode(PlayMode::Shuffle);
    p.select_track(0);
    for _ in 0..20 {
        finish_switch(&mut p, None, now);
        p.play_next();
        let index = p.state().current_index.unwrap();
        assert!(index < 4);
    }
}

#[test]
fn toggle_play_starts_the_first_track_then_flips() {
    let now = Instant::now();
    let mut p = player(3);

    p.toggle_play();
    assert_eq!(p.state().current_index, Some(0));
    finish_switch(&mut p, None, now);
    assert_eq!(p.state().phase, Phase::Playing);

    p.toggle_play();
    assert_eq!(p.state().phase, Phase::Paused);
    assert!(!p.media().playing);

    p.toggle_play();
    assert_eq!(p.state().phase, Phase::Playing);
    assert!(p.media().playing);
}

#[test]
fn toggling_while_loading_keeps_the_new_track_paused() {
    let now = Instant::now();
    let mut p = player(3);
    p.select_track(0);
    p.toggle_play();
    finish_switch(&mut p, None, now);

    assert_eq!(p.state().phase, Phase::Paused);
    assert!(!p.media().playing);
    assert_eq!(p.media().play_calls, 0);
}

#[test]
fn next_and_previous_without_a_current_track_pick_the_ends() {
    let mut p = player(3);
    p.play_previous();
    assert_eq!(p.state().current_index, Some(2));

    let mut p = player(3);
    p.play_next();
    assert_eq!(p.state().current_index, Some(0));

    let mut empty = player(0);
    empty.play_next();
    empty.toggle_play();
    assert_eq!(empty.state().current_index, None);
    assert_eq!(empty.state().phase, Phase::Idle);
}

fn fail(p: &mut TestPlayer, now: Instant) {
    let generation = p.generation();
    p.on_media_event(
        MediaEvent::Failed {
            generation,
            reason: "decode error".into(),
        },
        now,
    );
}

#[test]
fn failed_media_leaves_the_track_paused_with_the_placeholder() {
    let now = Instant::now();
    let mut p = player(3);
    p.select_track(0);
    fail(&mut p, now);
    assert_eq!(p.state().phase, Phase::Paused);
    assert_eq!(p.state().current_index, Some(0));
    assert!(!p.state().is_playing);
    assert_eq!(p.lyrics().lines().len(), 1);
    assert_eq!(p.lyrics().lines()[0].text, "No lyrics");

    // The reply for the abandoned switch does not replace the placeholder.
    deliver_lyrics(&mut p, Some(LRC));
    assert_eq!(p.lyrics().lines().len(), 1);
}

#[test]
fn playing_a_failed_track_reloads_it() {
    let now = Instant::now();
    let mut p = player(3);
    p.select_track(1);
    fail(&mut p, now);
    let failed_generation = p.generation();

    p.toggle_play();
    assert_eq!(p.state().phase, Phase::Loading);
    assert_eq!(p.state().current_index, Some(1));
    assert!(!p.state().is_playing);
    assert_eq!(p.media().play_calls, 0);
    assert!(p.generation() > failed_generation);
    assert_eq!(p.media().source, Some((TrackId(2), p.generation())));

    finish_switch(&mut p, Some(LRC), now);
    assert_eq!(p.state().phase, Phase::Playing);
    assert!(p.media().playing);
    assert_eq!(p.lyrics().lines().len(), 10);
}

#[test]
fn failure_after_lyrics_loaded_keeps_them() {
    let now = Instant::now();
    let mut p = player(3);
    p.select_track(0);
    deliver_lyrics(&mut p, Some(LRC));
    fail(&mut p, now);
    assert_eq!(p.state().phase, Phase::Paused);
    assert_eq!(p.lyrics().lines().len(), 10);
}

#[test]
fn pausing_during_seek_verification_stays_paused() {
    let t0 = Instant::now();
    let mut p = player(3);
    p.select_track(0);
    finish_switch(&mut p, Some(LRC), t0);

    assert_eq!(p.seek_to(50.0, t0), SeekOutcome::Requested { target: 50.0 });
    p.pause();
    p.tick(t0 + Duration::from_millis(150));
    assert_eq!(p.state().phase, Phase::Paused);
    assert!(!p.state().is_playing);
    assert!(!p.media().playing);
}

#[test]
fn pausing_while_awaiting_ready_stays_paused() {
    let t0 = Instant::now();
    let mut p = player(3);
    p.select_track(0);
    finish_switch(&mut p, Some(LRC), t0);

    p.media_mut().drop_seeks = true;
    p.seek_to(50.0, t0);
    p.tick(t0 + Duration::from_millis(150));
    p.pause();
    ready(&mut p, 200.0, t0 + Duration::from_millis(200));
    assert_eq!(p.media().seeks, vec![50.0]);
    assert!(!p.media().playing);
    assert_eq!(p.state().phase, Phase::Paused);
}

#[test]
fn manual_scroll_holds_autoscroll_until_the_quiet_period_passes() {
    let t0 = Instant::now();
    let mut p = player(1);
    p.select_track(0);
    finish_switch(&mut p, Some(LRC), t0);

    time_update(&mut p, 25.0, t0);
    assert_eq!(p.lyrics().current(), Some(2));
    assert_eq!(p.view().scroll_writes().last(), Some(&0.0));

    p.on_user_scroll(3.0, t0);
    assert_eq!(p.view().scroll_writes().last(), Some(&3.0));
    let writes = p.view().scroll_writes().len();

    // Index changes while the user is scrolling: highlight moves, pane stays.
    let t1 = t0 + Duration::from_secs(1);
    p.tick(t1);
    time_update(&mut p, 45.0, t1);
    assert_eq!(p.lyrics().current(), Some(4));
    assert_eq!(p.view().last_active_line(), Some(Some(4)));
    assert_eq!(p.view().scroll_writes().len(), writes);

    // Quiet period over: the next change recentres (line 5 of 10, 2 rows each).
    let t2 = t0 + Duration::from_millis(1600);
    p.tick(t2);
    time_update(&mut p, 55.0, t2);
    assert_eq!(p.lyrics().current(), Some(5));
    assert_eq!(p.view().scroll_writes().last(), Some(&6.0));
}

#[test]
fn unchanged_index_does_not_touch_the_view() {
    let now = Instant::now();
    let mut p = player(1);
    p.select_track(0);
    finish_switch(&mut p, Some(LRC), now);
    time_update(&mut p, 11.0, now);

    let actives = |p: &TestPlayer| {
        p.view()
            .calls
            .iter()
            .filter(|c| matches!(c, SinkCall::ActiveLine(_)))
            .count()
    };
    let before = actives(&p);
    time_update(&mut p, 12.0, now);
    time_update(&mut p, 19.9, now);
    assert_eq!(actives(&p), before);
}

#[test]
fn selecting_from_the_list_holds_autoscroll_until_released() {
    let t0 = Instant::now();
    let mut p = player(2);
    p.select_from_list(0, t0);
    finish_switch(&mut p, Some(LRC), t0);
    assert!(p.is_browsing(t0));
    let writes = p.view().scroll_writes().len();

    time_update(&mut p, 35.0, t0 + Duration::from_millis(300));
    assert_eq!(p.lyrics().current(), Some(3));
    assert_eq!(p.view().scroll_writes().len(), writes);

    // Clicking the lyric pane releases the hold right away.
    p.on_lyric_click();
    time_update(&mut p, 45.0, t0 + Duration::from_millis(400));
    assert_eq!(p.view().scroll_writes().last(), Some(&4.0));

    // And the hold also lapses on its own.
    let t1 = t0 + Duration::from_secs(5);
    p.select_from_list(1, t1);
    finish_switch(&mut p, Some(LRC), t1);
    p.tick(t1 + Duration::from_millis(1100));
    assert!(!p.is_browsing(t1 + Duration::from_millis(1100)));
}

#[test]
fn autoscroll_lock_keeps_the_pane_still() {
    let now = Instant::now();
    let mut p = player(1);
    p.select_track(0);
    finish_switch(&mut p, Some(LRC), now);
    assert!(!p.toggle_autoscroll());
    let writes = p.view().scroll_writes().len();

    time_update(&mut p, 75.0, now);
    assert_eq!(p.lyrics().current(), Some(7));
    assert_eq!(p.view().scroll_writes().len(), writes);
    assert!(p.toggle_autoscroll());
}

#[test]
fn time_updates_drive_the_progress_fill() {
    let now = Instant::now();
    let mut p = player(1);
    p.select_track(0);
    finish_switch(&mut p, None, now);
    time_update(&mut p, 100.0, now);
    assert!(p.view().calls.contains(&SinkCall::Progress(0.5)));
}

#[test]
fn pointer_seek_goes_through_the_media() {
    let now = Instant::now();
    let mut p = player(1);
    p.select_track(0);
    finish_switch(&mut p, None, now);

    let gauge = ProgressGeometry {
        origin_x: 0.0,
        width: 100.0,
    };
    assert_eq!(
        p.seek_pointer(50.0, &gauge, now),
        SeekOutcome::Requested { target: 100.0 }
    );
    assert!((p.current_time() - 100.0).abs() < 0.1);

    assert_eq!(
        p.seek_by(-30.0, now),
        SeekOutcome::Requested { target: 70.0 }
    );
}

#[test]
fn seeking_during_load_is_not_possible() {
    let mut p = player(1);
    p.select_track(0);
    let gauge = ProgressGeometry {
        origin_x: 0.0,
        width: 100.0,
    };
    assert_eq!(
        p.seek_pointer(50.0, &gauge, Instant::now()),
        SeekOutcome::CannotSeek
    );
}

#[test]
fn replacing_the_queue_keeps_the_playing_track_when_present() {
    let now = Instant::now();
    let mut p = player(3);
    p.select_track(1);
    finish_switch(&mut p, None, now);
    let generation = p.generation();

    p.set_queue("Road trip", vec![track(2, "track-2"), track(7, "other")]);
    assert_eq!(p.state().current_index, Some(0));
    assert_eq!(p.state().phase, Phase::Playing);
    assert_eq!(p.generation(), generation);
    assert!(p.view().calls.contains(&SinkCall::QueueTitle("Road trip".into())));

    p.set_queue("Elsewhere", vec![track(9, "x")]);
    assert_eq!(p.state().current_index, None);
    assert_eq!(p.state().phase, Phase::Idle);
    assert!(!p.media().playing);
}

#[test]
fn volume_saturates_and_reaches_the_media() {
    let mut p = player(1);
    assert_eq!(p.volume(), 80);
    assert_eq!(p.adjust_volume(30), 100);
    assert_eq!(p.media().volume, Some(1.0));
    assert_eq!(p.adjust_volume(-150), 0);
    assert_eq!(p.media().volume, Some(0.0));
}

#[test]
fn cycling_the_play_mode_updates_the_view() {
    let mut p = player(1);
    assert_eq!(p.cycle_play_mode(), PlayMode::Shuffle);
    assert_eq!(p.state().play_mode, PlayMode::Shuffle);
    assert!(p.view().calls.contains(&SinkCall::PlayMode(PlayMode::Shuffle)));
}

fn app(n: u32, playlists: Vec<PathBuf>) -> App<FakeMedia, RecordingFetcher, RecordingSink> {
    let p = Player::new(
        FakeMedia::default(),
        RecordingFetcher::default(),
        RecordingSink::default(),
        PlayerOptions::default(),
    );
    App::new(p, Library::from_parts(tracks(n), playlists))
}

#[test]
fn app_cursor_wraps_both_ways() {
    let mut a = app(3, vec![]);
    assert_eq!(a.player.queue().len(), 3);
    a.prev();
    assert_eq!(a.selected, 2);
    a.next();
    assert_eq!(a.selected, 0);
    a.set_selected(10);
    assert_eq!(a.selected, 0);
}

#[test]
fn app_plays_the_selected_track_as_browsing() {
    let now = Instant::now();
    let mut a = app(3, vec![]);
    a.set_selected(2);
    a.play_selected(now);
    assert_eq!(a.player.state().current_index, Some(2));
    assert!(a.player.is_browsing(now));
}

#[test]
fn app_keeps_its_queue_when_a_playlist_cannot_be_read() {
    let mut a = app(3, vec![PathBuf::from("/nope/missing.m3u")]);
    assert!(a.cycle_playlist().is_err());
    assert_eq!(a.playlist, PlaylistId::All);
    assert_eq!(a.player.queue().len(), 3);
}

#[test]
fn effect_label_cycles_back_to_original() {
    let mut a = app(1, vec![]);
    let mut seen = vec![a.effect];
    for _ in 0..8 {
        seen.push(a.cycle_effect());
    }
    assert_eq!(seen.first(), seen.last());
    assert_eq!(a.effect, Effect::Original);
}
