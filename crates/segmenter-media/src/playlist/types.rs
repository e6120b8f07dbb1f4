//! Playlist configuration and entries.

use std::num::NonZeroUsize;

/// How `#EXTINF` durations are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum DurationFormat {
    /// Six decimal places, e.g. `#EXTINF:5.005000,`.
    #[default]
    Decimal,
    /// Whole seconds rounded to nearest, for clients that predate
    /// fractional durations.
    Integer,
}

impl DurationFormat {
    /// Render a duration in seconds.
    pub fn format(&self, duration: f64) -> String {
        match self {
            DurationFormat::Decimal => format!("{:.6}", duration),
            DurationFormat::Integer => format!("{}", duration.round() as u64),
        }
    }
}

/// Settings for a [`PlaylistWriter`](super::PlaylistWriter).
#[derive(Debug, Clone)]
pub struct PlaylistOptions {
    /// Configured segment duration in seconds.
    pub target_duration: f64,
    /// Segment file name prefix (`<prefix>-<sequence>.<extension>`).
    pub output_prefix: String,
    /// Segment file extension without the dot.
    pub extension: String,
    /// Prepended verbatim to every segment file name in the playlist.
    pub http_prefix: String,
    /// Sequence number of the first segment.
    pub first_sequence: u64,
    /// Keep only this many entries and publish after every segment.
    pub max_window: Option<NonZeroUsize>,
    pub duration_format: DurationFormat,
}

impl PlaylistOptions {
    /// Options with sequence numbers starting at 1, no window and decimal
    /// durations.
    pub fn new(
        target_duration: f64,
        output_prefix: impl Into<String>,
        extension: impl Into<String>,
        http_prefix: impl Into<String>,
    ) -> Self {
        Self {
            target_duration,
            output_prefix: output_prefix.into(),
            extension: extension.into(),
            http_prefix: http_prefix.into(),
            first_sequence: 1,
            max_window: None,
            duration_format: DurationFormat::default(),
        }
    }

    pub fn with_first_sequence(mut self, first_sequence: u64) -> Self {
        self.first_sequence = first_sequence;
        self
    }

    pub fn with_window(mut self, max_window: Option<NonZeroUsize>) -> Self {
        self.max_window = max_window;
        self
    }

    pub fn with_duration_format(mut self, duration_format: DurationFormat) -> Self {
        self.duration_format = duration_format;
        self
    }

    /// `#EXT-X-TARGETDURATION` value: the configured duration rounded up.
    pub fn declared_target_duration(&self) -> u64 {
        self.target_duration.ceil() as u64
    }
}

/// One completed segment as listed in the playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    pub sequence: u64,
    pub duration: f64,
    /// Segment file name, relative to the output directory.
    pub filename: String,
    /// `http_prefix` followed by the file name.
    pub uri: String,
}
