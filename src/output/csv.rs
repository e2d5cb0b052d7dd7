//! CSV output formatting
//!
//! One row per box, suitable for analysis in a spreadsheet or pandas:
//!
//! ```text
//! id,kind,balls,color,max_balls,first_choice
//! 0,counting,2,,3,
//! 1,single_ball,1,green,,true
//! ```
//!
//! Columns that do not apply to a box flavor are left empty.

use crate::bins::{Bin, BinOps};
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: &str = "id,kind,balls,color,max_balls,first_choice";

/// CSV writer for per-box data
pub struct CsvWriter<W: Write> {
    out: W,
    rows: usize,
}

impl CsvWriter<BufWriter<File>> {
    /// Create the file and write the header row
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV output: {}", path.display()))?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvWriter<W> {
    /// Wrap a writer and write the header row
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "{}", HEADER)?;
        Ok(Self { out, rows: 0 })
    }

    /// Append one box
    pub fn append_bin(&mut self, bin: &Bin) -> Result<()> {
        let line = match bin {
            Bin::Counting(b) => format!("{},counting,{},,{},", b.id(), b.balls(), b.max_balls()),
            Bin::SingleBall(b) => format!(
                "{},single_ball,{},{},,{}",
                b.id(),
                b.balls(),
                b.color(),
                b.is_first_choice()
            ),
        };
        writeln!(self.out, "{}", line)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Write every box to `path`
pub fn write_bins_csv(path: &Path, bins: &[Bin]) -> Result<()> {
    let mut writer = CsvWriter::create(path)?;
    for bin in bins {
        writer.append_bin(bin)?;
    }
    writer
        .finish()
        .with_context(|| format!("Failed to write CSV output: {}", path.display()))?;
    Ok(())
}
