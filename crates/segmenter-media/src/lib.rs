//! Segmenter-Media: the segmentation core.
//!
//! Everything here is independent of the media library that demuxes the
//! input and muxes the segments; the [`pipeline`] traits are the seam.
//!
//! - [`rescale`]: time base selection and exact timestamp rescaling
//! - [`boundary`]: deciding at which keyframe a new segment starts
//! - [`playlist`]: the crash-safe playlist writer
//! - [`naming`]: segment and temporary playlist file names
//! - [`segmenter`]: the loop that drives all of the above

pub mod boundary;
pub mod naming;
pub mod pipeline;
pub mod playlist;
pub mod rescale;
pub mod segmenter;

pub use boundary::{BoundaryDecision, FinalSegmentPolicy, SegmentBoundaryState};
pub use pipeline::{PacketSource, ReadEvent, SegmentMuxer};
pub use playlist::{DurationFormat, PlaylistEntry, PlaylistOptions, PlaylistWriter};
pub use rescale::{effective_time_base, rescale, TimestampRescaler};
pub use segmenter::{GoverningTracks, RunSummary, Segmenter, SegmenterOptions};

pub use segmenter_common::{Error, Result};
