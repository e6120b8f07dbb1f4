//! FFmpeg implementation of the segmenter media pipeline.
//!
//! [`FfmpegSource`] demuxes the input and [`FfmpegMuxer`] stream-copies the
//! governing tracks into one output container per segment. Both sit behind
//! the `segmenter_media::pipeline` traits, so nothing else in the workspace
//! links against FFmpeg directly.

mod error;
mod format;
mod muxer;
mod source;

#[cfg(test)]
mod fixtures;

pub use format::{choose_extension, OutputFormat, DEFAULT_OUTPUT_FORMAT};
pub use muxer::FfmpegMuxer;
pub use source::{guess_input_format, FfmpegSource, FALLBACK_INPUT_FORMAT};

pub use segmenter_common::{Error, Result};

use ffmpeg_the_third as ffmpeg;
use std::sync::OnceLock;

static FFMPEG_INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Initialize FFmpeg once per process.
pub fn init() -> Result<()> {
    FFMPEG_INIT
        .get_or_init(|| ffmpeg::init().map_err(|e| e.to_string()))
        .clone()
        .map_err(|e| Error::format(format!("failed to initialize FFmpeg: {}", e)))
}

/// Convert an FFmpeg rational into the shared representation.
pub(crate) fn to_rational(value: ffmpeg::Rational) -> segmenter_common::Rational {
    segmenter_common::Rational::new(value.numerator(), value.denominator())
}
