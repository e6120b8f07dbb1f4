mod cli;

use segmenter::{config, job::SegmentJob};

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use segmenter_media::DurationFormat;
use std::num::NonZeroUsize;

fn main() -> Result<()> {
    // Usage errors exit with 1 like every other failure; --help and
    // --version exit with 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "segmenter=trace,segmenter_media=trace,segmenter_av=trace,segmenter_common=debug".to_string()
        } else {
            "segmenter=info,segmenter_media=info,segmenter_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config = config::load_config_or_default(cli.config.as_deref())?;
    let job = build_job(cli, &config);
    job.run()?;

    Ok(())
}

/// Command line options override the config file.
fn build_job(cli: Cli, config: &config::Config) -> SegmentJob {
    let mut job = SegmentJob::from_config(
        config,
        cli.input,
        cli.segment_duration,
        cli.playlist,
        cli.http_prefix,
    );

    if let Some(format) = cli.input_format {
        job.input_format = Some(format);
    }
    if let Some(format) = cli.output_format {
        job.output_format = format;
    }
    if let Some(prefix) = cli.output_prefix {
        job.output_prefix = Some(prefix);
    }
    if let Some(dir) = cli.output_dir {
        job.output_dir = Some(dir);
    }
    if let Some(first) = cli.first_sequence {
        job.first_sequence = first;
    }
    if let Some(window) = cli.max_segment_window {
        // 0 keeps every segment.
        job.window = NonZeroUsize::new(window);
    }
    if let Some(policy) = cli.final_segment {
        job.final_segment = policy;
    }
    if cli.integer_durations {
        job.duration_format = DurationFormat::Integer;
    }

    job
}
