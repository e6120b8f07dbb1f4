mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./segmenter.toml",
        "~/.config/segmenter/config.toml",
        "/etc/segmenter/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.segment.window == Some(0) {
        anyhow::bail!("Segment window cannot be 0 (leave it unset to keep every segment)");
    }

    if config.output.format.trim().is_empty() {
        anyhow::bail!("Output format cannot be empty");
    }

    if let Some(format) = &config.input.format {
        if format.trim().is_empty() {
            anyhow::bail!("Input format cannot be empty (leave it unset to detect it from the input name)");
        }
    }

    if let Some(prefix) = &config.output.prefix {
        if prefix.is_empty() {
            anyhow::bail!("Output prefix cannot be empty");
        }
    }

    if let Some(dir) = &config.output.dir {
        if !dir.is_dir() {
            tracing::warn!("Output directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}
