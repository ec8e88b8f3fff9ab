use crate::config::DisplaySettings;

use super::model::Track;

/// `m:ss` for a position in seconds. Negative or non-finite input reads as `0:00`.
pub fn format_mmss(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// The track's headline: title, followed by the artist when enabled.
pub fn display_name(track: &Track, settings: &DisplaySettings) -> String {
    match track.artist.as_deref() {
        Some(artist) if settings.show_artist => format!("{} - {}", track.title, artist),
        _ => track.title.clone(),
    }
}

/// Secondary details joined with ` · `, each gated by its `show_*` toggle.
pub fn detail_line(track: &Track, settings: &DisplaySettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    if settings.show_album {
        if let Some(album) = track.album.as_deref() {
            parts.push(album.to_string());
        }
    }
    if settings.show_filename {
        if let Some(name) = track.file_name() {
            parts.push(name.to_string());
        }
    }
    if settings.show_bitrate {
        if let Some(kbps) = track.bitrate {
            parts.push(format!("{kbps}kbps"));
        }
    }
    if settings.show_sample_rate {
        if let Some(hz) = track.sample_rate {
            parts.push(format!("{}kHz", (hz as f64 / 1000.0).round() as u32));
        }
    }
    if settings.show_file_type && !track.file_type.is_empty() {
        parts.push(track.file_type.to_ascii_uppercase());
    }

    parts.join(" · ")
}
