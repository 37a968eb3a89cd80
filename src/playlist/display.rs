use crate::config::TrackDisplayField;

use super::model::Track;

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Build a display string for a track according to the provided `fields` and separator.
///
/// Missing or blank fields are skipped. Falls back to the title when nothing was produced.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for f in fields {
        let part = match f {
            TrackDisplayField::Title => non_blank(Some(&track.title)),
            TrackDisplayField::Artist => non_blank(track.artist.as_deref()),
            TrackDisplayField::Album => non_blank(track.album.as_deref()),
            TrackDisplayField::Year => non_blank(track.year.as_deref()),
            TrackDisplayField::Url => non_blank(Some(&track.url)),
        };
        if let Some(p) = part {
            parts.push(p);
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(sep)
    }
}
