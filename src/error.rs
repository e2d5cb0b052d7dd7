//! Error types
//!
//! The simulator distinguishes three families of failure:
//!
//! - **Configuration errors** ([`BoundsError`]): raised while validating the
//!   number of boxes and draws, before any bin is allocated.
//! - **Engine errors** ([`EngineError`]): raised while a run is executing.
//!   These abort the run and are never retried.
//! - **Result contract errors** ([`ResultError`]): a run result that violates
//!   its own invariants (blank summary, fewer than two bins).
//!
//! Cancellation is not an error and has no variant here.

use crate::bins::BinError;
use std::io;
use thiserror::Error;

/// Invalid number of boxes or draws
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("Invalid number of boxes. Value: {value}, min: 2. Please give a value of 2 or more.")]
    InvalidBoxCount { value: i64 },

    #[error(
        "The number of draws is outside the interval. Value: {value}, min: {min}, max: {max}. \
         Please give a value between {min} and {max}."
    )]
    InvalidDrawCount { value: i64, min: usize, max: usize },

    #[error("Cannot validate {value} draws with an invalid number of boxes")]
    InvalidDrawCountForBoxes {
        value: i64,
        #[source]
        source: Box<BoundsError>,
    },

    #[error("Invalid number of boxes. Value: {value}, min: {min}, max: {max}.")]
    BoxCountOutOfRange { value: i64, min: usize, max: usize },
}

/// A run result that violates its invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultError {
    #[error("The summary is empty. The summary must not be empty.")]
    EmptySummary,

    #[error("The summary is filled with blank characters.")]
    BlankSummary,

    #[error("The list of boxes has only {count} boxes. The list must have 2 or more boxes.")]
    TooFewBins { count: usize },
}

/// Failure of a running simulation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Illegal bin state: {0}")]
    IllegalState(#[from] BinError),

    #[error("Linear probing from box {start} visited all {boxes} boxes without finding an empty one")]
    ProbeCycleDetected { start: usize, boxes: usize },

    #[error(
        "Cannot compute the box index. Tried {max_try} quadratic increments with these first indexes: {}",
        format_indices(.attempted_starts)
    )]
    CannotComputeIndex {
        attempted_starts: Vec<usize>,
        max_try: usize,
    },

    #[error("Cannot build the run result: {0}")]
    InvalidResult(#[from] ResultError),

    #[error("The worker thread stopped without reporting an outcome")]
    WorkerLost,
}

/// Any error a run can produce, from validation to completion
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The operating system refused the worker thread
    #[error("Failed to start the worker thread for run {run}")]
    Spawn {
        run: u64,
        #[source]
        source: io::Error,
    },
}

/// Join box indices as `"1, 4, 7"`
pub fn format_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
