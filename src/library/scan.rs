use std::path::Path;

use lofty::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Track, TrackId};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_blank(value: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read tags and stream properties for one file. Unreadable files still
/// become tracks, titled after their file stem.
fn read_track(path: &Path) -> Track {
    let mut track = Track {
        id: TrackId(0),
        path: path.to_path_buf(),
        title: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string(),
        artist: None,
        album: None,
        duration: None,
        bitrate: None,
        sample_rate: None,
        file_type: path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default(),
    };

    let tagged = match lofty::read_from_path(path) {
        Ok(tagged) => tagged,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable tags");
            return track;
        }
    };

    let properties = tagged.properties();
    track.duration = Some(properties.duration()).filter(|d| !d.is_zero());
    track.bitrate = properties.audio_bitrate().filter(|b| *b > 0);
    track.sample_rate = properties.sample_rate().filter(|r| *r > 0);

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(title) = non_blank(tag.title()) {
            track.title = title;
        }
        track.artist = non_blank(tag.artist());
        track.album = non_blank(tag.album());
    }

    track
}

/// Walk `dir` and collect every audio file into library order.
///
/// Tracks are sorted case-insensitively by title (then path) and numbered
/// from 1 in that order, so ids are stable for an unchanged directory.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(read_track(path));
        }
    }

    tracks.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.path.cmp(&b.path))
    });
    for (n, track) in tracks.iter_mut().enumerate() {
        track.id = TrackId(n as u32 + 1);
    }

    info!(dir = %dir.display(), count = tracks.len(), "library scanned");
    tracks
}
