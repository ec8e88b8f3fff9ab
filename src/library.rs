//! Music library: directory scanning, track metadata, playlists and the
//! formatting helpers used to list tracks.

mod display;
mod model;
mod playlist;
mod scan;

pub use display::{detail_line, display_name, format_mmss};
pub use model::*;
pub use playlist::{ALL_MUSIC, Library, parse_m3u};
pub use scan::scan;
