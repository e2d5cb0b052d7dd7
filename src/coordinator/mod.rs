//! Run controller
//!
//! The [`RunController`] owns at most one run at a time. It validates the
//! request, hands a fresh [`Execution`] to a background [`Worker`], and relays
//! the worker's events to a registered [`RunObserver`] on the caller's thread
//! whenever the caller polls or waits.
//!
//! # States
//!
//! ```text
//! Idle ──start──> Running ──> Completed | Cancelled | Failed
//!                    ^                       │
//!                    └──────── start ────────┘
//! ```
//!
//! Starting while a run is in flight cancels that run first: its cancel flag
//! is set and its channel is dropped before the new bin array exists, so none
//! of its late updates can be observed.
//!
//! # Example
//!
//! ```
//! use hashsim::coordinator::{RunController, RunRequest, RunState, NullObserver};
//! use hashsim::engine::Strategy;
//!
//! let mut controller = RunController::new(NullObserver);
//! controller.start(RunRequest::new(Strategy::DoubleChoice, 100, 80).with_seed(42))?;
//!
//! assert_eq!(controller.wait(), RunState::Completed);
//! let result = controller.take_result().unwrap();
//! assert_eq!(result.total_balls(), 80);
//! # Ok::<(), hashsim::error::RunError>(())
//! ```

use crate::bounds::RunBounds;
use crate::distribution::uniform::UniformDistribution;
use crate::distribution::IndexSource;
use crate::engine::{CancelToken, Execution, RunEvent, RunResult, StepUpdate, Strategy};
use crate::error::{EngineError, RunError};
use crate::worker::{Worker, WorkerMessage};
use crossbeam::channel::TryRecvError;
use log::{debug, info, warn};
use std::fmt;

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    /// True for states a new run may start from without cancelling anything
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Receives the events of the controller's runs
///
/// All callbacks run on the thread that calls [`RunController::poll`],
/// [`RunController::wait`], [`RunController::cancel`] or
/// [`RunController::start`]. Every method has an empty default.
pub trait RunObserver: Send {
    fn on_progress(&mut self, _percent: u8) {}

    fn on_step(&mut self, _update: &StepUpdate) {}

    fn on_completed(&mut self, _result: &RunResult) {}

    fn on_cancelled(&mut self) {}

    fn on_failed(&mut self, _error: &EngineError) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {}

/// Parameters of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    pub strategy: Strategy,
    pub boxes: i64,
    pub draws: i64,
    /// Seed for the uniform index source; entropy when `None`
    pub seed: Option<u64>,
}

impl RunRequest {
    pub fn new(strategy: Strategy, boxes: i64, draws: i64) -> Self {
        Self {
            strategy,
            boxes,
            draws,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Owns one run at a time and relays its events
pub struct RunController {
    observer: Box<dyn RunObserver>,
    state: RunState,
    worker: Option<Worker>,
    next_id: u64,
    result: Option<RunResult>,
    error: Option<EngineError>,
}

impl RunController {
    pub fn new(observer: impl RunObserver + 'static) -> Self {
        Self {
            observer: Box::new(observer),
            state: RunState::Idle,
            worker: None,
            next_id: 1,
            result: None,
            error: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Identifier of the run in flight
    pub fn current_run(&self) -> Option<u64> {
        self.worker.as_ref().map(|w| w.id())
    }

    /// Result of the last completed run
    pub fn result(&self) -> Option<&RunResult> {
        self.result.as_ref()
    }

    pub fn take_result(&mut self) -> Option<RunResult> {
        self.result.take()
    }

    /// Failure of the last failed run
    pub fn error(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }

    /// Start a run drawing indices uniformly at random
    ///
    /// Returns the new run's identifier. Invalid counts are rejected before
    /// anything else happens, in which case an in-flight run keeps running.
    pub fn start(&mut self, request: RunRequest) -> Result<u64, RunError> {
        let source = UniformDistribution::from_seed_option(request.seed);
        self.start_with_source(request, Box::new(source))
    }

    /// Start a run drawing indices from `source`; `request.seed` is ignored
    pub fn start_with_source(
        &mut self,
        request: RunRequest,
        source: Box<dyn IndexSource>,
    ) -> Result<u64, RunError> {
        let bounds = RunBounds::new(request.boxes, request.draws)?;

        if self.state == RunState::Running {
            warn!(
                "Discarding run {} to start a new one",
                self.current_run().unwrap_or_default()
            );
            self.cancel();
        }

        self.result = None;
        self.error = None;

        let id = self.next_id;
        self.next_id += 1;

        let execution = Execution::new(request.strategy, bounds, source, CancelToken::new());
        let worker =
            Worker::spawn(id, execution).map_err(|source| RunError::Spawn { run: id, source })?;

        info!(
            "Run {} started: {}, {} boxes, {} draws",
            id, request.strategy, bounds.boxes, bounds.draws
        );

        self.worker = Some(worker);
        self.state = RunState::Running;
        Ok(id)
    }

    /// Cancel the run in flight
    ///
    /// The state becomes `Cancelled` immediately and the observer is told so.
    /// Calling it again, or while nothing runs, does nothing.
    pub fn cancel(&mut self) {
        if self.state != RunState::Running {
            return;
        }

        if let Some(worker) = self.worker.take() {
            worker.cancel();
            info!("Run {} cancelled", worker.id());
        }

        self.state = RunState::Cancelled;
        self.observer.on_cancelled();
    }

    /// Relay every event already published, without blocking
    pub fn poll(&mut self) -> RunState {
        while self.state == RunState::Running {
            let received = match self.worker.as_ref() {
                Some(worker) => worker.events().try_recv(),
                None => Err(TryRecvError::Disconnected),
            };

            match received {
                Ok(message) => self.dispatch(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.fail(EngineError::WorkerLost),
            }
        }
        self.state
    }

    /// Relay events until the run in flight reaches a terminal state
    pub fn wait(&mut self) -> RunState {
        while self.state == RunState::Running {
            let received = match self.worker.as_ref() {
                Some(worker) => worker.events().recv().ok(),
                None => None,
            };

            match received {
                Some(message) => self.dispatch(message),
                None => self.fail(EngineError::WorkerLost),
            }
        }
        self.state
    }

    fn dispatch(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Event(RunEvent::Progress(percent)) => self.observer.on_progress(percent),
            WorkerMessage::Event(RunEvent::Step(update)) => self.observer.on_step(&update),
            WorkerMessage::Event(RunEvent::Completed(result)) => {
                if let Some(worker) = self.worker.take() {
                    info!(
                        "Run {} completed: {}",
                        worker.id(),
                        result.summary()
                    );
                }
                self.state = RunState::Completed;
                self.observer.on_completed(&result);
                self.result = Some(result);
            }
            WorkerMessage::Event(RunEvent::Cancelled) => {
                // Only reachable if the token was cancelled outside cancel()
                if let Some(worker) = self.worker.take() {
                    debug!("Run {} observed cancellation", worker.id());
                }
                self.state = RunState::Cancelled;
                self.observer.on_cancelled();
            }
            WorkerMessage::Failed(error) => self.fail(error),
        }
    }

    fn fail(&mut self, error: EngineError) {
        if let Some(worker) = self.worker.take() {
            warn!("Run {} failed: {}", worker.id(), error);
        }
        self.state = RunState::Failed;
        self.observer.on_failed(&error);
        self.error = Some(error);
    }
}

impl fmt::Debug for RunController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunController")
            .field("state", &self.state)
            .field("current_run", &self.current_run())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bins::BinOps;
    use crate::distribution::scripted::ScriptedDistribution;
    use crate::error::BoundsError;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Progress(u8),
        Step(usize, u32),
        Completed(String),
        Cancelled,
        Failed(String),
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Seen>>>);

    impl Recorder {
        fn seen(&self) -> Vec<Seen> {
            self.0.lock().unwrap().clone()
        }
    }

    impl RunObserver for Recorder {
        fn on_progress(&mut self, percent: u8) {
            self.0.lock().unwrap().push(Seen::Progress(percent));
        }

        fn on_step(&mut self, update: &StepUpdate) {
            self.0.lock().unwrap().push(Seen::Step(update.bin_id(), update.balls()));
        }

        fn on_completed(&mut self, result: &RunResult) {
            self.0.lock().unwrap().push(Seen::Completed(result.summary().to_string()));
        }

        fn on_cancelled(&mut self) {
            self.0.lock().unwrap().push(Seen::Cancelled);
        }

        fn on_failed(&mut self, error: &EngineError) {
            self.0.lock().unwrap().push(Seen::Failed(error.to_string()));
        }
    }

    fn scripted(indices: Vec<usize>) -> Box<dyn IndexSource> {
        Box::new(ScriptedDistribution::new(indices))
    }

    #[test]
    fn test_relays_events_in_order() {
        let recorder = Recorder::default();
        let mut controller = RunController::new(recorder.clone());
        assert_eq!(controller.state(), RunState::Idle);

        controller
            .start_with_source(RunRequest::new(Strategy::Chaining, 4, 2), scripted(vec![1, 1]))
            .unwrap();
        assert_eq!(controller.wait(), RunState::Completed);

        assert_eq!(
            recorder.seen(),
            vec![
                Seen::Progress(0),
                Seen::Step(1, 1),
                Seen::Step(1, 2),
                Seen::Progress(50),
                Seen::Progress(99),
                Seen::Progress(100),
                Seen::Completed("Most filled box(es) (2 balls): 1".to_string()),
            ]
        );

        let balls: Vec<u32> = controller.result().unwrap().bins().iter().map(|b| b.balls()).collect();
        assert_eq!(balls, vec![0, 2, 0, 0]);
        assert!(controller.current_run().is_none());
    }

    #[test]
    fn test_invalid_request_rejected_before_start() {
        let mut controller = RunController::new(NullObserver);
        let err = controller.start(RunRequest::new(Strategy::Chaining, 1, 1)).unwrap_err();
        assert!(matches!(
            err,
            RunError::Bounds(BoundsError::InvalidDrawCountForBoxes { value: 1, .. })
        ));
        assert_eq!(controller.state(), RunState::Idle);
    }

    #[test]
    fn test_invalid_request_keeps_current_run() {
        let mut controller = RunController::new(NullObserver);
        controller.start(RunRequest::new(Strategy::Chaining, 100, 100)).unwrap();
        assert!(controller.start(RunRequest::new(Strategy::Chaining, 100, 10)).is_err());
        assert_eq!(controller.wait(), RunState::Completed);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let recorder = Recorder::default();
        let mut controller = RunController::new(recorder.clone());

        controller.cancel();
        assert_eq!(controller.state(), RunState::Idle);

        controller
            .start_with_source(
                RunRequest::new(Strategy::Chaining, 10_000, 10_000),
                scripted(vec![0]),
            )
            .unwrap();
        controller.cancel();
        controller.cancel();

        assert_eq!(controller.state(), RunState::Cancelled);
        assert_eq!(controller.wait(), RunState::Cancelled);
        assert!(controller.result().is_none());

        let cancelled = recorder.seen().iter().filter(|s| **s == Seen::Cancelled).count();
        assert_eq!(cancelled, 1);
    }

    #[test]
    fn test_restart_discards_previous_run() {
        let recorder = Recorder::default();
        let mut controller = RunController::new(recorder.clone());

        let first = controller
            .start_with_source(
                RunRequest::new(Strategy::Chaining, 10_000, 10_000),
                scripted(vec![0]),
            )
            .unwrap();
        let second = controller
            .start_with_source(RunRequest::new(Strategy::Chaining, 4, 2), scripted(vec![3, 3]))
            .unwrap();
        assert!(second > first);
        assert_eq!(controller.wait(), RunState::Completed);

        let result = controller.take_result().unwrap();
        assert_eq!(result.bins().len(), 4);
        assert_eq!(result.total_balls(), 2);
        assert_eq!(result.bins()[3].balls(), 2);

        let seen = recorder.seen();
        let cancelled_at = seen.iter().position(|s| *s == Seen::Cancelled).unwrap();
        // Nothing from the first run shows up after it was discarded
        assert!(seen[cancelled_at + 1..]
            .iter()
            .all(|s| !matches!(s, Seen::Step(0, _))));
    }

    #[test]
    fn test_failure_reported_to_observer() {
        let recorder = Recorder::default();
        let mut controller = RunController::new(recorder.clone());

        controller
            .start_with_source(
                RunRequest::new(Strategy::QuadraticOpenAddressing, 4, 4),
                scripted(vec![0, 1, 3, 0, 0, 0]),
            )
            .unwrap();
        assert_eq!(controller.wait(), RunState::Failed);

        assert!(matches!(
            controller.error(),
            Some(EngineError::CannotComputeIndex { attempted_starts, .. }) if attempted_starts == &vec![0, 0, 0]
        ));
        assert!(controller.result().is_none());
        assert!(matches!(recorder.seen().last(), Some(Seen::Failed(_))));
    }

    #[test]
    fn test_poll_eventually_completes() {
        let mut controller = RunController::new(NullObserver);
        controller
            .start(RunRequest::new(Strategy::LinearOpenAddressing, 50, 50).with_seed(3))
            .unwrap();

        while controller.poll() == RunState::Running {
            std::thread::yield_now();
        }
        assert_eq!(controller.state(), RunState::Completed);
    }

    #[test]
    fn test_start_after_terminal_state() {
        let mut controller = RunController::new(NullObserver);
        controller.start(RunRequest::new(Strategy::Chaining, 10, 10).with_seed(1)).unwrap();
        assert_eq!(controller.wait(), RunState::Completed);

        controller.start(RunRequest::new(Strategy::DoubleChoice, 10, 5).with_seed(1)).unwrap();
        assert_eq!(controller.wait(), RunState::Completed);
        assert_eq!(controller.result().unwrap().strategy(), Strategy::DoubleChoice);
    }
}
