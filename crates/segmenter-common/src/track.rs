//! Track descriptions reported by the demuxer.

use crate::Rational;
use std::fmt;

/// Kind of elementary stream carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
    /// Subtitles, data and attachment tracks. Never segmented.
    Other,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Other => write!(f, "other"),
        }
    }
}

/// One track of the input container.
///
/// Produced once when the input is opened and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    /// Index of the track in the input container.
    pub index: usize,
    pub kind: MediaKind,
    /// Short codec name such as `h264` or `aac`.
    pub codec_id: String,
    /// Container stream time base.
    pub time_base: Rational,
    /// Decoder time base.
    pub codec_time_base: Rational,
    /// Decoder ticks per frame (2 for field-coded H.264, usually 1).
    pub ticks_per_frame: i32,
}

impl TrackDescriptor {
    /// Create a descriptor whose decoder time base equals the stream time base.
    pub fn new(index: usize, kind: MediaKind, time_base: Rational) -> Self {
        Self {
            index,
            kind,
            codec_id: String::new(),
            time_base,
            codec_time_base: time_base,
            ticks_per_frame: 1,
        }
    }

    /// Set the codec name.
    pub fn with_codec(mut self, codec_id: impl Into<String>) -> Self {
        self.codec_id = codec_id.into();
        self
    }

    /// Set the decoder time base and ticks per frame.
    pub fn with_codec_time_base(mut self, codec_time_base: Rational, ticks_per_frame: i32) -> Self {
        self.codec_time_base = codec_time_base;
        self.ticks_per_frame = ticks_per_frame;
        self
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    pub fn is_audio(&self) -> bool {
        self.kind == MediaKind::Audio
    }
}
