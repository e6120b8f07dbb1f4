//! M3U8 text for the playlist writer.

use super::types::{DurationFormat, PlaylistEntry};
use std::fmt::Write;

/// Playlist header. `media_sequence` is omitted when `None`.
pub(crate) fn header(target_duration: u64, media_sequence: Option<u64>) -> String {
    let mut out = String::new();

    writeln!(out, "#EXTM3U").unwrap();
    writeln!(out, "#EXT-X-TARGETDURATION:{}", target_duration).unwrap();
    if let Some(sequence) = media_sequence {
        writeln!(out, "#EXT-X-MEDIA-SEQUENCE:{}", sequence).unwrap();
    }

    out
}

/// One `#EXTINF` entry.
pub(crate) fn entry(entry: &PlaylistEntry, format: DurationFormat) -> String {
    let mut out = String::new();

    writeln!(out, "#EXTINF:{},", format.format(entry.duration)).unwrap();
    writeln!(out, "{}", entry.uri).unwrap();

    out
}

pub(crate) const END_LIST: &str = "#EXT-X-ENDLIST\n";

/// A complete playlist listing `entries`, as published in window mode.
pub(crate) fn window<'a>(
    target_duration: u64,
    entries: impl IntoIterator<Item = &'a PlaylistEntry>,
    first_visible: u64,
    format: DurationFormat,
    ended: bool,
) -> String {
    let mut out = header(target_duration, Some(first_visible));
    for item in entries {
        out.push_str(&entry(item, format));
    }
    if ended {
        out.push_str(END_LIST);
    }
    out
}
