//! Human-readable text output

use crate::bins::BinOps;
use crate::config::OutputConfig;
use crate::engine::RunResult;
use crate::error::format_indices;
use std::fmt;

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// Print run results to console
pub fn print_results(result: &RunResult, output: &OutputConfig) {
    print!("{}", Report { result, output });
}

/// Render the console report
pub fn render_results(result: &RunResult, output: &OutputConfig) -> String {
    Report { result, output }.to_string()
}

struct Report<'a> {
    result: &'a RunResult,
    output: &'a OutputConfig,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_results(f, self.result, self.output)
    }
}

/// Write the console report
///
/// Displays:
/// - Strategy, boxes and draws
/// - Most filled boxes (the run summary)
/// - First-choice versus displaced placements
/// - Probe lengths
/// - Every box (if `show_bins`)
pub fn write_results<W: fmt::Write>(
    out: &mut W,
    result: &RunResult,
    output: &OutputConfig,
) -> fmt::Result {
    let stats = result.stats();

    writeln!(out, "{}", RULE)?;
    writeln!(out, "                    SIMULATION RESULTS")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;

    writeln!(out, "Strategy: {}", result.strategy())?;
    writeln!(out, "Boxes:    {}", format_number(result.bins().len() as u64))?;
    writeln!(out, "Draws:    {}", format_number(stats.draws()))?;
    writeln!(out, "Elapsed:  {:.3}s", stats.elapsed().as_secs_f64())?;
    writeln!(out)?;

    writeln!(out, "{}", result.summary())?;
    writeln!(out)?;

    writeln!(out, "Placements:")?;
    writeln!(
        out,
        "  First choice: {} ({:.2}%)",
        format_number(stats.first_choice()),
        stats.first_choice_percent()
    )?;
    writeln!(out, "  Displaced:    {}", format_number(stats.displaced()))?;
    writeln!(out)?;

    let probes = stats.probes();
    writeln!(out, "Probes per draw:")?;
    if probes.is_empty() {
        writeln!(out, "  No draws recorded")?;
    } else {
        writeln!(out, "  Mean: {:.2}", probes.mean().unwrap_or(0.0))?;
        for &p in &[50.0, 90.0, 99.0] {
            writeln!(out, "  p{:<4}: {}", p, probes.percentile(p).unwrap_or(0))?;
        }
        writeln!(out, "  Max:  {}", probes.max().unwrap_or(0))?;
    }
    writeln!(out)?;

    if output.show_bins {
        writeln!(out, "Boxes:")?;
        for bin in result.bins() {
            writeln!(out, "  {}", bin)?;
        }
        writeln!(out)?;
    } else {
        let empty = result.bins().iter().filter(|b| b.is_empty()).count();
        writeln!(out, "Empty boxes: {}", format_number(empty as u64))?;
        writeln!(out, "Most filled: {}", format_indices(&result.most_filled()))?;
        writeln!(out)?;
    }

    writeln!(out, "{}", RULE)
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}
