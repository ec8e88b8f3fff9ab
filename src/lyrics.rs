//! Lyrics: LRC parsing, retrieval, and the synchronizer that keeps the
//! lyric pane's highlight and scroll position in step with playback.

mod parse;
mod scroll;
mod source;
mod sync;

pub use parse::{LyricLine, active_index, parse};
pub use scroll::{
    BrowsingFlag, DEFAULT_BROWSING_HOLD, DEFAULT_QUIET_PERIOD, ScrollSuppression,
    centered_offset, max_offset,
};
pub use source::{
    FsLyricSource, LyricFetcher, LyricReply, LyricSource, ThreadedFetcher, lines_from_result,
};
pub use sync::LyricSync;
