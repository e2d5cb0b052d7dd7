//! JSON output formatting
//!
//! The document holds the run parameters, the most filled boxes, placement
//! statistics and, optionally, every box:
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00.000Z",
//!   "strategy": "double_choice",
//!   "strategy_name": "Double Choices Hash Function",
//!   "boxes": 100,
//!   "draws": 80,
//!   "summary": "Most filled box(es) (3 balls): 12, 57",
//!   "max_balls": 3,
//!   "most_filled": [12, 57],
//!   "stats": { ... },
//!   "bins": [ ... ]
//! }
//! ```

use crate::bins::Bin;
use crate::engine::{RunResult, Strategy};
use crate::stats::RunStats;
use crate::Result;
use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// Duration with both microseconds and human-readable format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        let micros = d.as_micros() as u64;
        let human = format_duration_human(d);
        Self { micros, human }
    }
}

/// Probe length distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonProbes {
    pub mean: f64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub max: u64,
}

/// Placement statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonStats {
    pub first_choice: u64,
    pub displaced: u64,
    pub first_choice_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probes: Option<JsonProbes>,
    pub elapsed: JsonDuration,
}

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub strategy: Strategy,
    pub strategy_name: String,
    pub boxes: usize,
    pub draws: u64,
    pub seed: Option<u64>,
    pub summary: String,
    pub max_balls: u32,
    pub most_filled: Vec<usize>,
    pub stats: JsonStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<Vec<Bin>>,
}

/// Build the report for a completed run
pub fn build_report(result: &RunResult, seed: Option<u64>, include_bins: bool) -> JsonReport {
    JsonReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        strategy: result.strategy(),
        strategy_name: result.strategy().display_name().to_string(),
        boxes: result.bins().len(),
        draws: result.stats().draws(),
        seed,
        summary: result.summary().to_string(),
        max_balls: result.max_balls(),
        most_filled: result.most_filled(),
        stats: extract_stats(result.stats()),
        bins: include_bins.then(|| result.bins().to_vec()),
    }
}

fn extract_stats(stats: &RunStats) -> JsonStats {
    let hist = stats.probes();
    let probes = (!hist.is_empty()).then(|| JsonProbes {
        mean: hist.mean().unwrap_or(0.0),
        p50: hist.percentile(50.0).unwrap_or(0),
        p90: hist.percentile(90.0).unwrap_or(0),
        p99: hist.percentile(99.0).unwrap_or(0),
        max: hist.max().unwrap_or(0),
    });

    JsonStats {
        first_choice: stats.first_choice(),
        displaced: stats.displaced(),
        first_choice_percent: stats.first_choice_percent(),
        probes,
        elapsed: JsonDuration::from_duration(stats.elapsed()),
    }
}

/// Render the report as pretty-printed JSON
pub fn to_json_string(report: &JsonReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize JSON report")
}

/// Write JSON output to file
pub fn write_json_output(output_path: &Path, report: &JsonReport) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON output: {}", output_path.display()))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("Failed to write JSON output: {}", output_path.display()))?;
    writer.flush()?;

    Ok(())
}

/// Format duration in human-readable form
fn format_duration_human(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1_000 {
        format!("{}us", micros)
    } else if micros < 1_000_000 {
        format!("{:.2}ms", micros as f64 / 1_000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
