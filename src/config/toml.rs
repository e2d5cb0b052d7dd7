//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(boxes) = cli.boxes {
        config.run.boxes = boxes;
        // Draws from the file were sized for the file's box count
        if cli.draws.is_none() {
            config.run.draws = None;
        }
    }
    if let Some(draws) = cli.draws {
        config.run.draws = Some(draws);
    }
    if let Some(strategy) = cli.strategy {
        config.run.strategy = strategy.into();
    }
    if cli.seed.is_some() {
        config.run.seed = cli.seed;
    }

    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if cli.show_bins {
        config.output.show_bins = true;
    }
    if let Some(path) = &cli.json_output {
        config.output.json_path = Some(path.clone());
    }
    if let Some(path) = &cli.csv_output {
        config.output.csv_path = Some(path.clone());
    }
    if cli.progress {
        config.output.live_progress = true;
    }

    if cli.debug {
        config.runtime.debug = true;
    }
    if cli.dry_run {
        config.runtime.dry_run = true;
    }

    Ok(config)
}

/// Build the effective configuration: file (if any) overlaid with the CLI
pub fn load_config(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => Config::default(),
    };
    merge_cli_with_config(cli, base)
}
