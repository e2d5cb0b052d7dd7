//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//!
//! A configuration file mirrors the CLI flags:
//!
//! ```toml
//! [run]
//! boxes = 1000
//! draws = 800
//! strategy = "double_choice"
//! seed = 42
//!
//! [output]
//! format = "json"
//! show_bins = true
//! csv_path = "bins.csv"
//!
//! [runtime]
//! debug = false
//! ```
//!
//! Every section and every field is optional. CLI values take precedence over
//! file values (see [`toml::merge_cli_with_config`]).

pub mod cli;
pub mod toml;
pub mod validator;

use crate::engine::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Complete simulator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Draw count, defaulting to one ball per box
    pub fn draws(&self) -> i64 {
        self.run.draws.unwrap_or(self.run.boxes)
    }
}

/// What to simulate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of boxes (2-10000)
    #[serde(default = "default_boxes")]
    pub boxes: i64,
    /// Number of draws (boxes/2 to boxes); defaults to `boxes`
    #[serde(default)]
    pub draws: Option<i64>,
    /// Placement strategy
    #[serde(default)]
    pub strategy: Strategy,
    /// Random seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_boxes() -> i64 {
    100
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            boxes: default_boxes(),
            draws: None,
            strategy: Strategy::default(),
            seed: None,
        }
    }
}

/// Console report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Where and how results are reported
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Console report format
    #[serde(default)]
    pub format: OutputFormat,
    /// List every box in the text report
    #[serde(default)]
    pub show_bins: bool,
    /// Write the JSON report to this file
    #[serde(default)]
    pub json_path: Option<PathBuf>,
    /// Write the per-box CSV dump to this file
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    /// Print progress while the run executes
    #[serde(default)]
    pub live_progress: bool,
}

/// Runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
    /// Validate and print the configuration without running
    #[serde(default)]
    pub dry_run: bool,
}
