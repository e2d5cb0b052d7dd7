//! Allocation engine
//!
//! This module drives one simulation run: it allocates a fresh set of boxes,
//! places one ball per draw according to the selected [`Strategy`], keeps the
//! most-filled bookkeeping up to date and reports what happened as a stream of
//! [`RunEvent`]s.
//!
//! # Execution Model
//!
//! An [`Execution`] is a lazy, pull-based sequence: every call to `next()`
//! performs at most one draw and yields the events it produced. It can be
//! drained on the calling thread (see [`run_to_end`]) or moved to a worker
//! thread (see [`crate::worker`]).
//!
//! Every strategy reports progress in the same three phases:
//!
//! 1. During the loop: `min(98, draw * 100 / draws)`, with `draw` the 0-based
//!    index of the draw just completed
//! 2. After the loop: `99`
//! 3. After the summary is built: `100`
//!
//! Only changes are reported, so progress is strictly increasing.
//!
//! # Cancellation
//!
//! The [`CancelToken`] is checked before every draw and at every probing step.
//! A cancelled execution yields [`RunEvent::Cancelled`] and no result.
//!
//! # Example
//!
//! ```
//! use hashsim::engine::{run_to_end, Execution, Outcome, Strategy, CancelToken};
//! use hashsim::bounds::RunBounds;
//! use hashsim::distribution::scripted::ScriptedDistribution;
//!
//! let bounds = RunBounds::new(4, 2)?;
//! let execution = Execution::new(
//!     Strategy::Chaining,
//!     bounds,
//!     Box::new(ScriptedDistribution::new(vec![1, 1])),
//!     CancelToken::new(),
//! );
//!
//! match run_to_end(execution, |_| {})? {
//!     Outcome::Completed(result) => {
//!         assert_eq!(result.summary(), "Most filled box(es) (2 balls): 1");
//!     }
//!     Outcome::Cancelled => unreachable!(),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cancel;
pub mod chaining;
pub mod double_choice;
pub mod linear;
pub mod quadratic;

pub use cancel::CancelToken;

use crate::bins::{Bin, BinColor, BinOps};
use crate::bounds::RunBounds;
use crate::distribution::uniform::UniformDistribution;
use crate::distribution::IndexSource;
use crate::error::{EngineError, ResultError, RunError};
use crate::stats::tracker::MaxFillTracker;
use crate::stats::RunStats;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

/// Ball placement strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Unbounded boxes, one random choice
    Chaining,
    /// Unbounded boxes, less filled of two random choices
    DoubleChoice,
    /// Single-ball boxes, walk forward on collision
    #[serde(alias = "linear")]
    LinearOpenAddressing,
    /// Single-ball boxes, quadratic offsets on collision
    #[serde(alias = "quadratic")]
    QuadraticOpenAddressing,
}

impl Strategy {
    /// All strategies, in selector order
    pub const ALL: [Strategy; 4] = [
        Strategy::Chaining,
        Strategy::DoubleChoice,
        Strategy::LinearOpenAddressing,
        Strategy::QuadraticOpenAddressing,
    ];

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Chaining => "Chaining Hash Function",
            Self::DoubleChoice => "Double Choices Hash Function",
            Self::LinearOpenAddressing => "Linear Open Addressing Hash Function",
            Self::QuadraticOpenAddressing => "Quadratic Open Addressing Hash Function",
        }
    }

    /// True for strategies whose boxes hold at most one ball
    pub fn is_open_addressing(self) -> bool {
        matches!(self, Self::LinearOpenAddressing | Self::QuadraticOpenAddressing)
    }

    /// Fresh, empty boxes of the flavor this strategy fills
    pub fn new_bins(self, boxes: usize) -> Vec<Bin> {
        if self.is_open_addressing() {
            (0..boxes).map(Bin::single_ball).collect()
        } else {
            (0..boxes).map(Bin::counting).collect()
        }
    }

    /// Place one ball; `Ok(None)` when cancellation was observed mid-probe
    fn place(
        self,
        bins: &mut [Bin],
        source: &mut dyn IndexSource,
        cancel: &CancelToken,
    ) -> Result<Option<Placement>, EngineError> {
        match self {
            Self::Chaining => chaining::place(bins, source, cancel),
            Self::DoubleChoice => double_choice::place(bins, source, cancel),
            Self::LinearOpenAddressing => linear::place(bins, source, cancel),
            Self::QuadraticOpenAddressing => quadratic::place(bins, source, cancel),
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Chaining
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Where one ball ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    /// Box that received the ball
    pub index: usize,
    /// Boxes inspected for this draw
    pub probes: u64,
    /// Ball landed at the first box considered
    pub first_choice: bool,
}

/// A single box changed during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepUpdate {
    /// 1-based number of draws completed
    pub draw: usize,
    /// Snapshot of the box after the ball landed
    pub bin: Bin,
    /// Running summary, e.g. `"Most filled box(es) (2 balls): 1, 5"`
    pub summary: String,
}

impl StepUpdate {
    pub fn bin_id(&self) -> usize {
        self.bin.id()
    }

    pub fn balls(&self) -> u32 {
        self.bin.balls()
    }

    pub fn color(&self) -> Option<BinColor> {
        self.bin.color()
    }
}

/// Final state of a completed run
#[derive(Debug, Clone)]
pub struct RunResult {
    strategy: Strategy,
    summary: String,
    bins: Vec<Bin>,
    stats: RunStats,
}

impl RunResult {
    /// Build a result, enforcing a non-blank summary and at least two boxes
    pub fn new(
        strategy: Strategy,
        summary: String,
        bins: Vec<Bin>,
        stats: RunStats,
    ) -> Result<Self, ResultError> {
        if summary.is_empty() {
            return Err(ResultError::EmptySummary);
        }
        if summary.trim().is_empty() {
            return Err(ResultError::BlankSummary);
        }
        if bins.len() < 2 {
            return Err(ResultError::TooFewBins { count: bins.len() });
        }

        Ok(Self {
            strategy,
            summary,
            bins,
            stats,
        })
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Hand the boxes over to the caller
    pub fn into_bins(self) -> Vec<Bin> {
        self.bins
    }

    pub fn total_balls(&self) -> u64 {
        self.bins.iter().map(|b| b.balls() as u64).sum()
    }

    /// Highest ball count of any box
    pub fn max_balls(&self) -> u32 {
        self.bins.iter().map(|b| b.balls()).max().unwrap_or(0)
    }

    /// Boxes holding [`Self::max_balls`] balls, in index order
    pub fn most_filled(&self) -> Vec<usize> {
        let max = self.max_balls();
        self.bins
            .iter()
            .filter(|b| b.balls() == max)
            .map(|b| b.id())
            .collect()
    }
}

/// Something that happened during a run
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Progress in percent, strictly increasing, ending at 100
    Progress(u8),
    /// A ball was placed
    Step(StepUpdate),
    /// The run finished; always the last event
    Completed(RunResult),
    /// Cancellation was observed; always the last event
    Cancelled,
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Cancelled)
    }
}

/// Terminal outcome of a run that did not fail
#[derive(Debug, Clone)]
pub enum Outcome {
    Completed(RunResult),
    Cancelled,
}

/// One run of one strategy, producing events on demand
pub struct Execution {
    strategy: Strategy,
    draws: usize,
    next_draw: usize,
    bins: Vec<Bin>,
    source: Box<dyn IndexSource>,
    cancel: CancelToken,
    tracker: MaxFillTracker,
    stats: RunStats,
    last_progress: Option<u8>,
    pending: VecDeque<RunEvent>,
    started_at: Option<Instant>,
    finished: bool,
}

impl Execution {
    /// Prepare a run; boxes are allocated here, empty
    pub fn new(
        strategy: Strategy,
        bounds: RunBounds,
        source: Box<dyn IndexSource>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            strategy,
            draws: bounds.draws,
            next_draw: 0,
            bins: strategy.new_bins(bounds.boxes.get()),
            source,
            cancel,
            tracker: MaxFillTracker::new(),
            stats: RunStats::new(),
            last_progress: None,
            pending: VecDeque::new(),
            started_at: None,
            finished: false,
        }
    }

    /// Validate raw counts and prepare a uniformly random run
    pub fn uniform(
        strategy: Strategy,
        boxes: i64,
        draws: i64,
        seed: Option<u64>,
        cancel: CancelToken,
    ) -> Result<Self, RunError> {
        let bounds = RunBounds::new(boxes, draws)?;
        Ok(Self::new(
            strategy,
            bounds,
            Box::new(UniformDistribution::from_seed_option(seed)),
            cancel,
        ))
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Boxes in their current state; empty once the result has been handed out
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    fn report_progress(&mut self, percent: u8) {
        if self.last_progress.map_or(true, |last| percent > last) {
            self.last_progress = Some(percent);
            self.pending.push_back(RunEvent::Progress(percent));
        }
    }

    fn finish_cancelled(&mut self) {
        self.finished = true;
        self.pending.push_back(RunEvent::Cancelled);
    }

    /// Run one step of the state machine, queueing its events
    fn advance(&mut self) -> Result<(), EngineError> {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
            self.report_progress(0);
            return Ok(());
        }

        if self.cancel.is_cancelled() {
            self.finish_cancelled();
            return Ok(());
        }

        if self.next_draw < self.draws {
            self.draw_once()
        } else {
            self.finish()
        }
    }

    fn draw_once(&mut self) -> Result<(), EngineError> {
        let placement = match self
            .strategy
            .place(&mut self.bins, self.source.as_mut(), &self.cancel)?
        {
            Some(placement) => placement,
            None => {
                self.finish_cancelled();
                return Ok(());
            }
        };

        let bin = &self.bins[placement.index];
        self.tracker.record(placement.index, bin.balls());
        self.stats
            .record_placement(placement.probes, placement.first_choice);

        let draw = self.next_draw;
        self.next_draw += 1;

        self.pending.push_back(RunEvent::Step(StepUpdate {
            draw: self.next_draw,
            bin: bin.clone(),
            summary: self.tracker.summary(),
        }));

        let percent = (draw * 100 / self.draws).min(98);
        self.report_progress(percent as u8);

        Ok(())
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        self.report_progress(99);

        let summary = self.tracker.summary();
        let max_balls = self.tracker.current_max();
        for bin in self.bins.iter_mut() {
            if let Some(counting) = bin.as_counting_mut() {
                counting.set_max_balls(max_balls);
            }
        }

        self.report_progress(100);

        if let Some(started_at) = self.started_at {
            self.stats.set_elapsed(started_at.elapsed());
        }

        let result = RunResult::new(
            self.strategy,
            summary,
            std::mem::take(&mut self.bins),
            std::mem::take(&mut self.stats),
        )?;

        self.finished = true;
        self.pending.push_back(RunEvent::Completed(result));
        Ok(())
    }
}

impl Iterator for Execution {
    type Item = Result<RunEvent, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.advance() {
                self.finished = true;
                self.pending.clear();
                return Some(Err(e));
            }
        }
    }
}

/// Drain an execution on the current thread
///
/// Every event except the terminal one is passed to `on_event`.
pub fn run_to_end(
    execution: Execution,
    mut on_event: impl FnMut(&RunEvent),
) -> Result<Outcome, EngineError> {
    for event in execution {
        match event? {
            RunEvent::Completed(result) => return Ok(Outcome::Completed(result)),
            RunEvent::Cancelled => return Ok(Outcome::Cancelled),
            other => on_event(&other),
        }
    }
    // An execution always ends with a terminal event or an error
    Err(EngineError::WorkerLost)
}

/// Validate, run and drain a uniformly random simulation
pub fn simulate(
    strategy: Strategy,
    boxes: i64,
    draws: i64,
    seed: Option<u64>,
) -> Result<Outcome, RunError> {
    let execution = Execution::uniform(strategy, boxes, draws, seed, CancelToken::new())?;
    Ok(run_to_end(execution, |_| {})?)
}
