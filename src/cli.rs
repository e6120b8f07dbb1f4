use clap::Parser;
use segmenter_media::FinalSegmentPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "segmenter")]
#[command(author, version, about = "Split an audio/video stream into HLS segments and write their playlist")]
pub struct Cli {
    /// Force the input container format instead of probing it
    #[arg(short = 'e', long = "input-format", value_name = "FORMAT")]
    pub input_format: Option<String>,

    /// Container format of the segment files [default: mpegts]
    #[arg(short = 'f', long = "output-format", value_name = "FORMAT")]
    pub output_format: Option<String>,

    /// Segment file name prefix [default: input file name without extension]
    #[arg(short = 'p', long = "output-prefix", value_name = "PREFIX")]
    pub output_prefix: Option<String>,

    /// Sequence number of the first segment [default: 1]
    #[arg(short = 's', long = "first-sequence", value_name = "N")]
    pub first_sequence: Option<u64>,

    /// Directory segment files are written to
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Duration of the last segment when the input does not report one
    #[arg(long, value_name = "POLICY", value_parser = parse_final_segment)]
    pub final_segment: Option<FinalSegmentPolicy>,

    /// Write #EXTINF durations as whole seconds
    #[arg(long)]
    pub integer_durations: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Input file or URL, `-` for standard input
    pub input: String,

    /// Target segment duration in seconds
    #[arg(value_parser = parse_segment_duration)]
    pub segment_duration: f64,

    /// Playlist file to write
    pub playlist: PathBuf,

    /// Prefix prepended to segment file names in the playlist
    pub http_prefix: String,

    /// Keep only the most recent N segments (0 keeps all)
    pub max_segment_window: Option<usize>,
}

fn parse_segment_duration(value: &str) -> Result<f64, String> {
    let duration: f64 = value
        .parse()
        .map_err(|_| format!("invalid segment duration {:?}", value))?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(format!("segment duration must be positive, got {}", value));
    }
    Ok(duration)
}

fn parse_final_segment(value: &str) -> Result<FinalSegmentPolicy, String> {
    match value.to_ascii_lowercase().as_str() {
        "nominal" => Ok(FinalSegmentPolicy::Nominal),
        "measured" => Ok(FinalSegmentPolicy::Measured),
        _ => Err(format!("expected `nominal` or `measured`, got {:?}", value)),
    }
}
