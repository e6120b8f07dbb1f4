//! The segmentation loop.
//!
//! [`Segmenter::run`] reads packets from a [`PacketSource`], decides where
//! segments start, rotates the [`SegmentMuxer`] between segment files and
//! keeps the [`PlaylistWriter`] in step with the files that have been closed.
//!
//! Ordering guarantees:
//! - a segment is closed before the next one is opened
//! - a playlist entry is written only after its segment has been closed
//! - the boundary packet is the first packet of the new segment

mod tracks;

pub use tracks::GoverningTracks;

use crate::boundary::{BoundaryDecision, FinalSegmentPolicy, SegmentBoundaryState};
use crate::pipeline::{PacketSource, ReadEvent, SegmentMuxer};
use crate::playlist::{PlaylistEntry, PlaylistWriter};
use crate::rescale::TimestampRescaler;
use segmenter_common::{Error, MediaKind, Result};
use std::path::{Path, PathBuf};
use tracks::FrameClock;

/// Settings for one run that are not part of the playlist.
#[derive(Debug, Clone, Default)]
pub struct SegmenterOptions {
    pub final_segment: FinalSegmentPolicy,
    /// Directory segment files are written to. Relative file names resolve
    /// against the working directory when unset.
    pub output_dir: Option<PathBuf>,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of segments recorded, including the final one.
    pub segments: u64,
    pub first_sequence: u64,
    /// Sequence number of the final segment.
    pub last_sequence: u64,
    /// Sum of the recorded segment durations in seconds.
    pub total_duration: f64,
    pub packets_written: u64,
    /// Packets the muxer rejected.
    pub packets_skipped: u64,
    /// Packets of tracks that are not segmented.
    pub packets_dropped: u64,
    /// The loop ended on a write or read failure rather than end of input.
    pub stopped_early: bool,
    /// Where the playlist was published.
    pub playlist: PathBuf,
}

impl RunSummary {
    fn new(first_sequence: u64) -> Self {
        Self {
            segments: 0,
            first_sequence,
            last_sequence: first_sequence,
            total_duration: 0.0,
            packets_written: 0,
            packets_skipped: 0,
            packets_dropped: 0,
            stopped_early: false,
            playlist: PathBuf::new(),
        }
    }
}

/// Per-track state built once the first segment is open.
#[derive(Debug, Clone, Copy)]
struct TrackState {
    index: usize,
    kind: MediaKind,
    rescaler: TimestampRescaler,
}

/// Drives one segmentation run.
pub struct Segmenter<S, M> {
    source: S,
    muxer: M,
    playlist: PlaylistWriter,
    boundary: SegmentBoundaryState,
    governing: GoverningTracks,
    options: SegmenterOptions,
}

impl<S: PacketSource, M: SegmentMuxer> Segmenter<S, M> {
    /// Create a segmenter. Fails when the source has no audio or video track.
    /// Every other track is discarded at the source.
    pub fn new(
        mut source: S,
        muxer: M,
        playlist: PlaylistWriter,
        options: SegmenterOptions,
    ) -> Result<Self> {
        let governing = GoverningTracks::select(source.tracks())?;
        let boundary = SegmentBoundaryState::new(playlist.options().target_duration)?;

        let ignored: Vec<usize> = source
            .tracks()
            .iter()
            .map(|track| track.index)
            .filter(|index| !governing.contains(*index))
            .collect();
        for index in ignored {
            source.discard_track(index);
        }

        for track in governing.iter() {
            tracing::info!(
                "Segmenting {} track {} ({}, time base {})",
                track.kind,
                track.index,
                track.codec_id,
                track.time_base
            );
        }

        Ok(Self {
            source,
            muxer,
            playlist,
            boundary,
            governing,
            options,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn muxer(&self) -> &M {
        &self.muxer
    }

    pub fn playlist(&self) -> &PlaylistWriter {
        &self.playlist
    }

    pub fn governing(&self) -> &GoverningTracks {
        &self.governing
    }

    /// Segment the whole input and publish the playlist.
    ///
    /// Errors before the first packet (playlist or first segment cannot be
    /// created) and failures to open a later segment abort without
    /// publishing. A write failure on a segment ends the stream early; the
    /// segments written so far are still published.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.playlist.begin()?;

        let first = self.segment_path(self.playlist.pending_segment_filename());
        self.muxer.open_segment(&first)?;
        tracing::debug!("Opened segment {:?}", first);

        let tracks = self.track_states()?;
        if let Some(start) = self.source.start_time() {
            tracing::debug!("Input starts at {}", start);
            self.boundary.start_at(start);
        }
        let cut_track = self.governing.cut_track();
        let mut clock = FrameClock::new(&self.governing);
        let mut summary = RunSummary::new(self.playlist.sequence_number());

        loop {
            let mut packet = match self.source.read_packet() {
                ReadEvent::Packet(packet) => packet,
                ReadEvent::TryAgain => continue,
                ReadEvent::EndOfStream => break,
                ReadEvent::Error(e) => {
                    tracing::warn!("Failed to read input, treating as end of stream: {}", e);
                    summary.stopped_early = true;
                    break;
                }
            };

            let Some(track) = tracks.iter().find(|t| t.index == packet.track_index) else {
                summary.packets_dropped += 1;
                continue;
            };

            let input_duration = packet.duration;
            let is_keyframe = packet.is_keyframe;
            let pts = packet.pts;

            if let Some(time) = track.rescaler.rescale_packet(&mut packet) {
                let end = match pts {
                    Some(pts) if input_duration > 0 => {
                        track.rescaler.stream_time(pts.saturating_add(input_duration))
                    }
                    _ => time,
                };
                clock.update(track.kind, time, end);

                let frame_time = clock.frame_time();
                tracing::trace!(
                    "{} frame time {} (track {}, keyframe {})",
                    track.kind,
                    frame_time,
                    track.index,
                    is_keyframe
                );

                let eligible = track.index == cut_track;
                if let BoundaryDecision::Cut { duration } =
                    self.boundary.evaluate(frame_time, is_keyframe, eligible)
                {
                    self.rotate(duration, &mut summary)?;
                }
            }

            match self.muxer.write_packet(packet) {
                Ok(()) => summary.packets_written += 1,
                Err(Error::Io(e)) => {
                    tracing::error!("Failed to write segment, ending stream early: {}", e);
                    summary.stopped_early = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Skipping packet on track {}: {}", track.index, e);
                    summary.packets_skipped += 1;
                }
            }
        }

        if let Err(e) = self.muxer.close_segment() {
            if !summary.stopped_early {
                return Err(e);
            }
            tracing::warn!("Failed to close the last segment cleanly: {}", e);
        }

        let duration = self.boundary.final_duration(
            self.source.start_time(),
            self.source.duration(),
            clock.latest_end(),
            self.options.final_segment,
        );
        self.record(duration, &mut summary);

        summary.playlist = self.playlist.finalize()?;

        tracing::info!(
            "Wrote {} segments ({:.3}s) to {:?}",
            summary.segments,
            summary.total_duration,
            summary.playlist
        );

        Ok(summary)
    }

    /// Close the current segment, record it and open the next one.
    fn rotate(&mut self, duration: f64, summary: &mut RunSummary) -> Result<()> {
        self.muxer.close_segment()?;
        self.record(duration, summary);

        let next = self.segment_path(self.playlist.pending_segment_filename());
        self.muxer.open_segment(&next)?;
        tracing::debug!("Opened segment {:?}", next);
        Ok(())
    }

    /// Add the just-closed segment to the playlist. Playlist failures are
    /// logged; the writer refuses to publish later on its own.
    fn record(&mut self, duration: f64, summary: &mut RunSummary) {
        let sequence = self.playlist.sequence_number();

        match self.playlist.record(duration) {
            Ok(evicted) => {
                tracing::info!("Segment {} complete ({:.3}s)", sequence, duration);
                if let Some(entry) = evicted {
                    self.remove_segment(&entry);
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Continuing without playlist updates after segment {}: {}",
                    sequence,
                    e
                );
            }
        }

        summary.segments += 1;
        summary.last_sequence = sequence;
        summary.total_duration += duration;
    }

    fn remove_segment(&self, entry: &PlaylistEntry) {
        let path = self.segment_path(&entry.filename);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!("Removed expired segment {:?}", path),
            Err(e) => tracing::warn!("Failed to remove expired segment {:?}: {}", path, e),
        }
    }

    fn segment_path(&self, filename: &str) -> PathBuf {
        match &self.options.output_dir {
            Some(dir) => dir.join(filename),
            None => Path::new(filename).to_path_buf(),
        }
    }

    fn track_states(&self) -> Result<Vec<TrackState>> {
        self.governing
            .iter()
            .map(|track| {
                let output = self.muxer.output_time_base(track.index).ok_or_else(|| {
                    Error::mux(format!("no output stream for track {}", track.index))
                })?;
                let rescaler = TimestampRescaler::for_track(track, output);
                tracing::debug!(
                    "Track {}: {} -> {}",
                    track.index,
                    rescaler.input_time_base(),
                    rescaler.output_time_base()
                );
                Ok(TrackState {
                    index: track.index,
                    kind: track.kind,
                    rescaler,
                })
            })
            .collect()
    }
}
