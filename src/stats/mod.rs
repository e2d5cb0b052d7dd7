//! Run statistics
//!
//! Bookkeeping collected as a by-product of the placement loop:
//!
//! - **Max fill**: the most filled boxes, see [`tracker::MaxFillTracker`]
//! - **Placements**: how many balls landed at their first choice versus how
//!   many were displaced (second choice or probed further)
//! - **Probe lengths**: boxes inspected per draw, see
//!   [`histogram::ProbeHistogram`]
//! - **Elapsed time**: wall clock duration of the placement loop

pub mod histogram;
pub mod tracker;

use histogram::ProbeHistogram;
use std::time::Duration;

/// Statistics of a single run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    draws: u64,
    first_choice: u64,
    displaced: u64,
    probes: ProbeHistogram,
    elapsed: Duration,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one placed ball
    pub fn record_placement(&mut self, probes: u64, first_choice: bool) {
        self.draws += 1;
        if first_choice {
            self.first_choice += 1;
        } else {
            self.displaced += 1;
        }
        self.probes.record(probes);
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn first_choice(&self) -> u64 {
        self.first_choice
    }

    pub fn displaced(&self) -> u64 {
        self.displaced
    }

    pub fn probes(&self) -> &ProbeHistogram {
        &self.probes
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Share of balls placed at their first choice, in percent
    pub fn first_choice_percent(&self) -> f64 {
        if self.draws == 0 {
            return 0.0;
        }
        self.first_choice as f64 * 100.0 / self.draws as f64
    }
}
