//! CLI argument parsing using clap

use crate::bounds::BoxesRange;
use crate::config::OutputFormat;
use crate::engine::Strategy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Placement strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// One random box per ball, unbounded boxes
    Chaining,
    /// Less filled of two random boxes
    DoubleChoice,
    /// Linear open addressing, one ball per box
    Linear,
    /// Quadratic open addressing, one ball per box
    Quadratic,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Chaining => Strategy::Chaining,
            StrategyArg::DoubleChoice => Strategy::DoubleChoice,
            StrategyArg::Linear => Strategy::LinearOpenAddressing,
            StrategyArg::Quadratic => Strategy::QuadraticOpenAddressing,
        }
    }
}

/// Console report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// hashsim - balls-into-bins hashing simulator
#[derive(Parser, Debug)]
#[command(name = "hashsim")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // === Run ===
    /// Number of boxes (2-10000)
    #[arg(short = 'b', long)]
    pub boxes: Option<i64>,

    /// Number of draws (boxes/2 to boxes, defaults to boxes)
    #[arg(short = 'd', long)]
    pub draws: Option<i64>,

    /// Placement strategy
    #[arg(short = 's', long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML configuration file
    #[arg(long, env = "HASHSIM_CONFIG")]
    pub config: Option<PathBuf>,

    // === Output ===
    /// Console report format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// List every box in the text report
    #[arg(long)]
    pub show_bins: bool,

    /// Write the JSON report to a file
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Write the per-box CSV dump to a file
    #[arg(long)]
    pub csv_output: Option<PathBuf>,

    /// Print progress while the run executes
    #[arg(long)]
    pub progress: bool,

    // === Runtime ===
    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    pub dry_run: bool,

    /// List the available strategies and exit
    #[arg(long)]
    pub list_strategies: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations that clap cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(boxes) = self.boxes {
            let range = BoxesRange::default();
            if !range.contains(boxes) {
                anyhow::bail!(
                    "--boxes must be between {} and {}, got {}",
                    range.min(),
                    range.max(),
                    boxes
                );
            }
        }

        if let Some(draws) = self.draws {
            if draws < 1 {
                anyhow::bail!("--draws must be at least 1, got {}", draws);
            }
        }

        if self.json_output.is_some() && self.json_output == self.csv_output {
            anyhow::bail!("--json-output and --csv-output must point to different files");
        }

        Ok(())
    }
}
