//! Utilities for resolving track urls and creating `rodio` sinks.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::engine::EngineError;

/// Map a playlist url onto the filesystem.
///
/// `file:///abs/path` is used as is. Anything else, with or without a leading
/// `/`, is taken relative to `media_root`.
pub(super) fn resolve_media_path(media_root: &Path, url: &str) -> PathBuf {
    if let Some(rest) = url.strip_prefix("file://") {
        let p = Path::new(rest);
        if p.is_absolute() {
            return p.to_path_buf();
        }
        return media_root.join(rest);
    }
    media_root.join(url.trim_start_matches('/'))
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Also returns the decoder's idea of the total duration, when it has one.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), EngineError> {
    let file = File::open(path).map_err(|e| EngineError::Open {
        url: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
        url: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let total = decoder.total_duration();
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
