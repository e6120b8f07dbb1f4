//! Writing segments with FFmpeg.
//!
//! Every segment gets its own output context: streams are added by copying
//! the input codec parameters, the header is written on open and the trailer
//! on close, so each segment file is a complete container.

use crate::error::from_ffmpeg;
use crate::source::FfmpegSource;
use crate::to_rational;
use ffmpeg_the_third as ffmpeg;
use segmenter_common::{Error, Packet, Rational, Result};
use segmenter_media::{GoverningTracks, SegmentMuxer};
use std::path::{Path, PathBuf};

/// One output stream, fed by one governing input track.
struct OutputStream {
    track_index: usize,
    parameters: ffmpeg::codec::Parameters,
    time_base: Option<Rational>,
}

struct OpenSegment {
    context: ffmpeg::format::context::Output,
    path: PathBuf,
}

/// Stream-copies the governing tracks into one container per segment.
pub struct FfmpegMuxer {
    format_name: String,
    streams: Vec<OutputStream>,
    current: Option<OpenSegment>,
}

impl FfmpegMuxer {
    /// Prepare a muxer for `format_name` carrying the governing tracks of
    /// `source`, video first.
    pub fn new(format_name: &str, governing: &GoverningTracks, source: &FfmpegSource) -> Result<Self> {
        crate::init()?;

        let streams = governing
            .iter()
            .map(|track| {
                Ok(OutputStream {
                    track_index: track.index,
                    parameters: source.codec_parameters(track.index)?,
                    time_base: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            format_name: format_name.to_string(),
            streams,
            current: None,
        })
    }

    fn stream_position(&self, track_index: usize) -> Option<usize> {
        self.streams.iter().position(|s| s.track_index == track_index)
    }

    fn create_context(&self, path: &Path) -> Result<ffmpeg::format::context::Output> {
        let mut context = ffmpeg::format::output_as(path, &self.format_name)
            .map_err(|e| from_ffmpeg(e, &format!("failed to create segment {}", path.display())))?;

        for stream in &self.streams {
            let mut output_stream = context
                .add_stream(ffmpeg::encoder::find(ffmpeg::codec::Id::None))
                .map_err(|e| from_ffmpeg(e, "failed to add output stream"))?;

            output_stream.set_parameters(stream.parameters.clone());

            // Tags from the input container may be invalid in the output one.
            // SAFETY: the stream and its parameters are owned by the context.
            unsafe {
                (*(*output_stream.as_mut_ptr()).codecpar).codec_tag = 0;
            }
        }

        context
            .write_header()
            .map_err(|e| from_ffmpeg(e, &format!("failed to write header of {}", path.display())))?;

        Ok(context)
    }
}

impl SegmentMuxer for FfmpegMuxer {
    fn open_segment(&mut self, path: &Path) -> Result<()> {
        if let Some(open) = &self.current {
            return Err(Error::mux(format!(
                "cannot open {} while {} is open",
                path.display(),
                open.path.display()
            )));
        }

        let context = self.create_context(path)?;

        for (i, stream) in self.streams.iter_mut().enumerate() {
            let time_base = context.stream(i).map(|s| to_rational(s.time_base()));
            if stream.time_base.is_some() && stream.time_base != time_base {
                tracing::warn!(
                    "Output time base of track {} changed between segments ({:?} -> {:?})",
                    stream.track_index,
                    stream.time_base,
                    time_base
                );
            }
            stream.time_base = time_base;
        }

        tracing::trace!("Segment {:?} header written", path);
        self.current = Some(OpenSegment {
            context,
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn output_time_base(&self, track_index: usize) -> Option<Rational> {
        let position = self.stream_position(track_index)?;
        self.streams[position].time_base
    }

    fn write_packet(&mut self, packet: Packet) -> Result<()> {
        let position = self
            .stream_position(packet.track_index)
            .ok_or_else(|| Error::mux(format!("track {} is not muxed", packet.track_index)))?;
        let segment = self
            .current
            .as_mut()
            .ok_or_else(|| Error::mux("no segment is open"))?;

        let mut output = ffmpeg::Packet::copy(&packet.data);
        output.set_pts(packet.pts);
        output.set_dts(packet.dts);
        output.set_duration(packet.duration);
        output.set_stream(position);
        output.set_position(-1);
        if packet.is_keyframe {
            output.set_flags(ffmpeg::codec::packet::Flags::KEY);
        }

        output
            .write_interleaved(&mut segment.context)
            .map_err(|e| from_ffmpeg(e, &format!("failed to write packet to {}", segment.path.display())))
    }

    fn close_segment(&mut self) -> Result<()> {
        let mut segment = self
            .current
            .take()
            .ok_or_else(|| Error::mux("no segment is open"))?;

        segment
            .context
            .write_trailer()
            .map_err(|e| from_ffmpeg(e, &format!("failed to finish {}", segment.path.display())))?;

        tracing::trace!("Segment {:?} closed", segment.path);
        // Dropping the context closes the file.
        Ok(())
    }
}
