use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::LibrarySettings;
use crate::error::LibraryError;

use super::model::{Playlist, PlaylistId, Track};
use super::scan::scan;

pub const ALL_MUSIC: &str = "All music";

#[derive(Debug, Clone)]
struct PlaylistFile {
    name: String,
    path: PathBuf,
}

/// The scanned music directory: every track plus the playlists found at its root.
#[derive(Debug, Clone, Default)]
pub struct Library {
    tracks: Vec<Track>,
    playlists: Vec<PlaylistFile>,
}

impl Library {
    pub fn load(root: &Path, settings: &LibrarySettings) -> Self {
        let tracks = scan(root, settings);
        let playlists = discover_playlists(root);
        info!(count = playlists.len(), "playlists discovered");
        Self { tracks, playlists }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(tracks: Vec<Track>, playlist_paths: Vec<PathBuf>) -> Self {
        let playlists = playlist_paths
            .into_iter()
            .map(|path| PlaylistFile {
                name: playlist_name(&path),
                path,
            })
            .collect();
        Self { tracks, playlists }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Every playlist id with its display name, "All music" first.
    pub fn playlists(&self) -> Vec<(PlaylistId, &str)> {
        std::iter::once((PlaylistId::All, ALL_MUSIC))
            .chain(
                self.playlists
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (PlaylistId::File(i), p.name.as_str())),
            )
            .collect()
    }

    /// The playlist after `current`, wrapping back to "All music".
    pub fn next_playlist_id(&self, current: &PlaylistId) -> PlaylistId {
        match current {
            PlaylistId::All if !self.playlists.is_empty() => PlaylistId::File(0),
            PlaylistId::File(i) if i + 1 < self.playlists.len() => PlaylistId::File(i + 1),
            _ => PlaylistId::All,
        }
    }

    /// Resolve a playlist into library tracks. Entries that do not match a
    /// scanned track are skipped.
    pub fn playlist(&self, id: &PlaylistId) -> Result<Playlist, LibraryError> {
        let file = match id {
            PlaylistId::All => {
                return Ok(Playlist {
                    id: PlaylistId::All,
                    name: ALL_MUSIC.to_string(),
                    tracks: self.tracks.clone(),
                });
            }
            PlaylistId::File(i) => self
                .playlists
                .get(*i)
                .ok_or_else(|| LibraryError::UnknownPlaylist(format!("#{i}")))?,
        };

        let text = fs::read_to_string(&file.path).map_err(|source| LibraryError::Playlist {
            path: file.path.clone(),
            source,
        })?;
        let base = file.path.parent().unwrap_or(Path::new("."));

        let by_path: HashMap<PathBuf, &Track> = self
            .tracks
            .iter()
            .map(|t| (normalize(&t.path), t))
            .collect();

        let mut tracks = Vec::new();
        for entry in parse_m3u(&text, base) {
            match by_path.get(&normalize(&entry)) {
                Some(track) => tracks.push((*track).clone()),
                None => debug!(entry = %entry.display(), "playlist entry not in library"),
            }
        }

        Ok(Playlist {
            id: id.clone(),
            name: file.name.clone(),
            tracks,
        })
    }
}

fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn playlist_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("playlist")
        .to_string()
}

fn is_playlist_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "m3u" | "m3u8"))
        .unwrap_or(false)
}

fn discover_playlists(root: &Path) -> Vec<PlaylistFile> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "cannot list playlists");
            return Vec::new();
        }
    };

    let mut playlists: Vec<PlaylistFile> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_playlist_file(p))
        .map(|path| PlaylistFile {
            name: playlist_name(&path),
            path,
        })
        .collect();
    playlists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    playlists
}

/// Parse an M3U body into paths. Comments (`#EXTM3U`, `#EXTINF`, ...) and
/// blank lines are skipped; relative entries resolve against `base`.
pub fn parse_m3u(text: &str, base: &Path) -> Vec<PathBuf> {
    text.lines()
        .map(|l| l.trim().trim_start_matches('\u{feff}'))
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| {
            let p = Path::new(l);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        })
        .collect()
}
