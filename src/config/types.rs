use segmenter_media::{DurationFormat, FinalSegmentPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub segment: SegmentConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub playlist: PlaylistConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SegmentConfig {
    /// Sequence number of the first segment (default: 1)
    #[serde(default = "default_first_sequence")]
    pub first_sequence: u64,

    /// Keep only the most recent segments and publish after each one
    #[serde(default)]
    pub window: Option<usize>,

    /// Duration reported for the last segment when the input's is unknown
    #[serde(default)]
    pub final_segment: FinalSegmentPolicy,
}

fn default_first_sequence() -> u64 {
    1
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            first_sequence: default_first_sequence(),
            window: None,
            final_segment: FinalSegmentPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Force a demuxer instead of probing the input
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Muxer for segment files (default: mpegts)
    #[serde(default = "default_output_format")]
    pub format: String,

    /// Segment file name prefix (default: input file name without extension)
    #[serde(default)]
    pub prefix: Option<String>,

    /// Directory segment files are written to (default: working directory)
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_output_format() -> String {
    segmenter_av::DEFAULT_OUTPUT_FORMAT.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            prefix: None,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaylistConfig {
    /// `decimal` (default) or `integer` #EXTINF durations
    #[serde(default)]
    pub duration_format: DurationFormat,
}
