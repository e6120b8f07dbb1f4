//! One segmentation job: settings resolved from the command line and config
//! file, and the wiring that runs them against FFmpeg.

use crate::config::Config;
use anyhow::{Context, Result};
use segmenter_av::{FfmpegMuxer, FfmpegSource, OutputFormat};
use segmenter_media::{
    DurationFormat, FinalSegmentPolicy, GoverningTracks, PacketSource, PlaylistOptions,
    PlaylistWriter, RunSummary, Segmenter, SegmenterOptions,
};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Input name that reads from standard input.
pub const STDIN_INPUT: &str = "-";

#[derive(Debug, Clone)]
pub struct SegmentJob {
    pub input: String,
    pub input_format: Option<String>,
    pub output_format: String,
    pub output_prefix: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub segment_duration: f64,
    pub playlist: PathBuf,
    pub http_prefix: String,
    pub window: Option<NonZeroUsize>,
    pub first_sequence: u64,
    pub final_segment: FinalSegmentPolicy,
    pub duration_format: DurationFormat,
}

impl SegmentJob {
    /// A job for the required arguments, with everything else taken from
    /// `config`.
    pub fn from_config(
        config: &Config,
        input: impl Into<String>,
        segment_duration: f64,
        playlist: impl Into<PathBuf>,
        http_prefix: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            input_format: config.input.format.clone(),
            output_format: config.output.format.clone(),
            output_prefix: config.output.prefix.clone(),
            output_dir: config.output.dir.clone(),
            segment_duration,
            playlist: playlist.into(),
            http_prefix: http_prefix.into(),
            window: config.segment.window.and_then(NonZeroUsize::new),
            first_sequence: config.segment.first_sequence,
            final_segment: config.segment.final_segment,
            duration_format: config.playlist.duration_format,
        }
    }

    /// Segment file name prefix: the configured one, or the input's file
    /// name without its extension.
    pub fn resolved_prefix(&self) -> Result<String> {
        if let Some(prefix) = &self.output_prefix {
            return Ok(prefix.clone());
        }
        if self.input == STDIN_INPUT {
            anyhow::bail!("An output prefix (-p) is required when reading from standard input");
        }
        derive_prefix(&self.input).with_context(|| {
            format!("Cannot derive an output prefix from {:?}; pass one with -p", self.input)
        })
    }

    /// Extension of the input, if it has one.
    pub fn input_extension(&self) -> Option<String> {
        if self.input == STDIN_INPUT {
            return None;
        }
        input_extension(&self.input)
    }

    /// Segment the input and publish the playlist.
    pub fn run(&self) -> Result<RunSummary> {
        if !self.segment_duration.is_finite() || self.segment_duration <= 0.0 {
            anyhow::bail!("Segment duration must be positive, got {}", self.segment_duration);
        }

        // Everything that can be checked without touching the input comes
        // first so a bad invocation never blocks on standard input.
        let prefix = self.resolved_prefix()?;
        let format = OutputFormat::resolve(&self.output_format, self.input_extension().as_deref())?;
        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        }

        let source = FfmpegSource::open(&self.input, self.input_format.as_deref())
            .with_context(|| format!("Failed to open input {}", self.input))?;
        let governing = GoverningTracks::select(source.tracks())?;
        let muxer = FfmpegMuxer::new(&format.name, &governing, &source)?;

        let options = PlaylistOptions::new(
            self.segment_duration,
            prefix,
            format.extension,
            self.http_prefix.clone(),
        )
        .with_first_sequence(self.first_sequence)
        .with_window(self.window)
        .with_duration_format(self.duration_format);
        let playlist = PlaylistWriter::new(&self.playlist, options)?;

        tracing::info!(
            "Segmenting {} into {}s {} segments, playlist {:?}",
            self.input,
            self.segment_duration,
            format.name,
            self.playlist
        );

        let mut segmenter = Segmenter::new(
            source,
            muxer,
            playlist,
            SegmenterOptions {
                final_segment: self.final_segment,
                output_dir: self.output_dir.clone(),
            },
        )?;
        let summary = segmenter.run()?;

        if summary.stopped_early {
            tracing::warn!(
                "Input ended early; published {} segments to {:?}",
                summary.segments,
                summary.playlist
            );
        } else {
            tracing::info!(
                "Published {} segments ({:.3}s) to {:?}",
                summary.segments,
                summary.total_duration,
                summary.playlist
            );
        }

        Ok(summary)
    }
}

/// The input's file name without its extension.
pub fn derive_prefix(input: &str) -> Option<String> {
    Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn input_extension(input: &str) -> Option<String> {
    Path::new(input)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_string)
}
