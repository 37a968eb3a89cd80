use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;

/// Read the stream duration from the file's properties without decoding audio.
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    let tagged = lofty::read_from_path(path).ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}
