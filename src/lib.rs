//! hashsim - balls-into-bins hashing simulator
//!
//! hashsim throws a number of balls into a number of boxes and reports how
//! evenly they spread, comparing four classic hash-table collision strategies.
//!
//! # Architecture
//!
//! - **Bounds**: validated box and draw counts
//! - **Bins**: counting boxes and single-ball (green/red) boxes
//! - **Engine**: one lazy execution per run, one module per strategy
//! - **Worker / Coordinator**: background run with start, cancel and restart
//! - **Output**: text report, JSON document, per-box CSV

pub mod bins;
pub mod bounds;
pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod output;
pub mod stats;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{RunController, RunRequest, RunState};
pub use engine::{RunResult, Strategy};

/// Result type used throughout hashsim
pub type Result<T> = anyhow::Result<T>;
