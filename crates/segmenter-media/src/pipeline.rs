//! The seam between the segmentation core and the media library.
//!
//! A [`PacketSource`] demuxes the input, a [`SegmentMuxer`] writes segment
//! files. The FFmpeg implementations live in `segmenter-av`; tests drive the
//! core with synthetic ones.

use segmenter_common::{Error, Packet, Rational, Result, StreamTime, TrackDescriptor};
use std::path::Path;

/// Outcome of one read from a [`PacketSource`].
#[derive(Debug)]
pub enum ReadEvent {
    /// The next packet, in input order.
    Packet(Packet),
    /// The input is exhausted.
    EndOfStream,
    /// Nothing is available yet; reading again may succeed.
    TryAgain,
    /// The input failed. The segmenter treats this as the end of the stream.
    Error(Error),
}

/// A demuxed input.
pub trait PacketSource {
    /// Every track of the input, in container order.
    fn tracks(&self) -> &[TrackDescriptor];

    /// Read the next packet.
    fn read_packet(&mut self) -> ReadEvent;

    /// Total duration of the input, when the container declares one.
    fn duration(&self) -> Option<StreamTime>;

    /// Presentation time of the input's first frame, when the container
    /// declares one. [`duration`](Self::duration) counts from here.
    fn start_time(&self) -> Option<StreamTime> {
        None
    }

    /// Stop demuxing a track that will not be segmented. Sources that cannot
    /// skip tracks keep delivering their packets, which are then dropped.
    fn discard_track(&mut self, _track_index: usize) {}
}

/// Writes packets into one segment file at a time.
pub trait SegmentMuxer {
    /// Create the segment file at `path` and write its header.
    fn open_segment(&mut self, path: &Path) -> Result<()>;

    /// Time base the open segment uses for the given input track, once the
    /// header has been written.
    fn output_time_base(&self, track_index: usize) -> Option<Rational>;

    /// Write one packet whose timestamps are already in output ticks.
    fn write_packet(&mut self, packet: Packet) -> Result<()>;

    /// Write the trailer, flush and close the open segment.
    fn close_segment(&mut self) -> Result<()>;
}
