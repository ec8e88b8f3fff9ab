//! Utilities for creating `rodio` sinks from file paths.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::AudioError;

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Also returns the decoder's total duration when the format reports one.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), AudioError> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let total = decoder.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    // `skip_duration` is the fallback seeking primitive; Duration::ZERO is a no-op.
    sink.append(decoder.skip_duration(start_at));
    Ok((sink, total))
}
