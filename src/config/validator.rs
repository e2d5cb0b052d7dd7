//! Configuration validation

use super::*;
use crate::bounds::{BoxesRange, DrawRange};
use anyhow::{Context, Result};

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_run(&config.run)?;
    validate_output(&config.output)?;

    Ok(())
}

/// Validate run configuration against the application box limits
pub fn validate_run(run: &RunConfig) -> Result<()> {
    let boxes = BoxesRange::default()
        .check(run.boxes)
        .context("Invalid run.boxes")?;

    let draws = run.draws.unwrap_or(run.boxes);
    DrawRange::new(boxes)
        .check(draws)
        .with_context(|| format!("Invalid run.draws for {} boxes", boxes))?;

    Ok(())
}

/// Validate output configuration
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if let (Some(json), Some(csv)) = (&output.json_path, &output.csv_path) {
        if json == csv {
            anyhow::bail!(
                "output.json_path and output.csv_path must differ, both are {}",
                json.display()
            );
        }
    }

    for path in [&output.json_path, &output.csv_path].into_iter().flatten() {
        if path.as_os_str().is_empty() {
            anyhow::bail!("output paths must not be empty");
        }
    }

    Ok(())
}
