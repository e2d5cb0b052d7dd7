//! End-to-end runs through the public API

use hashsim::bins::{BinColor, BinOps};
use hashsim::coordinator::{NullObserver, RunController, RunObserver, RunRequest, RunState};
use hashsim::distribution::scripted::ScriptedDistribution;
use hashsim::engine::{RunResult, StepUpdate, Strategy};
use hashsim::error::EngineError;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Log {
    progress: Vec<u8>,
    steps: Vec<StepUpdate>,
    completed: usize,
    cancelled: usize,
    failed: Vec<EngineError>,
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Log>>);

impl RunObserver for Shared {
    fn on_progress(&mut self, percent: u8) {
        self.0.lock().unwrap().progress.push(percent);
    }

    fn on_step(&mut self, update: &StepUpdate) {
        self.0.lock().unwrap().steps.push(update.clone());
    }

    fn on_completed(&mut self, _result: &RunResult) {
        self.0.lock().unwrap().completed += 1;
    }

    fn on_cancelled(&mut self) {
        self.0.lock().unwrap().cancelled += 1;
    }

    fn on_failed(&mut self, error: &EngineError) {
        self.0.lock().unwrap().failed.push(error.clone());
    }
}

#[test]
fn test_every_strategy_end_to_end() {
    for strategy in Strategy::ALL {
        let shared = Shared::default();
        let mut controller = RunController::new(shared.clone());

        // Half load keeps quadratic probing well within its retry budget
        controller
            .start(RunRequest::new(strategy, 200, 100).with_seed(2024))
            .unwrap();
        assert_eq!(controller.wait(), RunState::Completed, "{}", strategy);

        let result = controller.take_result().unwrap();
        assert_eq!(result.strategy(), strategy);
        assert_eq!(result.total_balls(), 100);

        if strategy.is_open_addressing() {
            assert!(result.bins().iter().all(|b| b.balls() <= 1));
            let green = result
                .bins()
                .iter()
                .filter(|b| b.color() == Some(BinColor::Green) && b.balls() == 1)
                .count() as u64;
            assert_eq!(green, result.stats().first_choice());
        }

        let log = shared.0.lock().unwrap();
        assert_eq!(log.steps.len(), 100);
        assert_eq!(log.completed, 1);
        assert_eq!(log.progress.first(), Some(&0));
        assert_eq!(log.progress.last(), Some(&100));
        assert!(log.progress.windows(2).all(|w| w[0] < w[1]));

        // Last running summary is the final one
        assert_eq!(log.steps.last().unwrap().summary, result.summary());
    }
}

#[test]
fn test_same_seed_same_bins() {
    let run = |seed| {
        let mut controller = RunController::new(NullObserver);
        controller
            .start(RunRequest::new(Strategy::DoubleChoice, 500, 400).with_seed(seed))
            .unwrap();
        controller.wait();
        controller.take_result().unwrap().into_bins()
    };

    assert_eq!(run(99), run(99));
}

#[test]
fn test_cancel_then_restart() {
    let shared = Shared::default();
    let mut controller = RunController::new(shared.clone());

    controller
        .start_with_source(
            RunRequest::new(Strategy::LinearOpenAddressing, 10_000, 10_000),
            Box::new(ScriptedDistribution::new(vec![0])),
        )
        .unwrap();
    controller.cancel();
    assert_eq!(controller.state(), RunState::Cancelled);
    assert!(controller.result().is_none());

    controller
        .start_with_source(
            RunRequest::new(Strategy::LinearOpenAddressing, 2, 1),
            Box::new(ScriptedDistribution::new(vec![0])),
        )
        .unwrap();
    assert_eq!(controller.wait(), RunState::Completed);

    let result = controller.result().unwrap();
    assert_eq!(result.bins().len(), 2);
    assert_eq!(result.bins()[0].balls(), 1);
    assert_eq!(result.bins()[0].color(), Some(BinColor::Green));
    assert_eq!(result.bins()[1].balls(), 0);

    let log = shared.0.lock().unwrap();
    assert_eq!(log.cancelled, 1);
    assert_eq!(log.completed, 1);
}

#[test]
fn test_failure_does_not_poison_controller() {
    let shared = Shared::default();
    let mut controller = RunController::new(shared.clone());

    controller
        .start_with_source(
            RunRequest::new(Strategy::QuadraticOpenAddressing, 4, 4),
            Box::new(ScriptedDistribution::new(vec![0, 1, 3, 0, 0, 0])),
        )
        .unwrap();
    assert_eq!(controller.wait(), RunState::Failed);
    assert!(controller.error().unwrap().to_string().contains("first indexes: 0, 0, 0"));

    controller
        .start(RunRequest::new(Strategy::Chaining, 4, 2).with_seed(1))
        .unwrap();
    assert_eq!(controller.wait(), RunState::Completed);
    assert!(controller.error().is_none());

    let log = shared.0.lock().unwrap();
    assert_eq!(log.failed.len(), 1);
    assert_eq!(log.completed, 1);
}

#[test]
fn test_controller_moves_across_threads() {
    let mut controller = RunController::new(NullObserver);
    controller
        .start(RunRequest::new(Strategy::Chaining, 1000, 1000).with_seed(5))
        .unwrap();

    let handle = std::thread::spawn(move || {
        let state = controller.wait();
        (state, controller.take_result().map(|r| r.total_balls()))
    });

    assert_eq!(handle.join().unwrap(), (RunState::Completed, Some(1000)));
}

#[test]
fn test_unread_run_waits_for_consumer() {
    let shared = Shared::default();
    let mut controller = RunController::new(shared.clone());
    controller
        .start(RunRequest::new(Strategy::LinearOpenAddressing, 2000, 2000).with_seed(1))
        .unwrap();

    // Nothing is relayed until the caller reads
    std::thread::sleep(std::time::Duration::from_millis(100));
    assert_eq!(controller.state(), RunState::Running);
    assert!(shared.0.lock().unwrap().steps.is_empty());

    assert_eq!(controller.wait(), RunState::Completed);
    let log = shared.0.lock().unwrap();
    let draws: Vec<usize> = log.steps.iter().map(|s| s.draw).collect();
    assert_eq!(draws, (1..=2000).collect::<Vec<_>>());
    assert_eq!(log.completed, 1);
}

#[test]
fn test_cancel_releases_unread_run() {
    let mut controller = RunController::new(NullObserver);
    controller
        .start(RunRequest::new(Strategy::LinearOpenAddressing, 10_000, 10_000).with_seed(1))
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(100));

    controller.cancel();
    assert_eq!(controller.state(), RunState::Cancelled);

    controller
        .start(RunRequest::new(Strategy::Chaining, 10, 10).with_seed(1))
        .unwrap();
    assert_eq!(controller.wait(), RunState::Completed);
    assert_eq!(controller.take_result().unwrap().total_balls(), 10);
}
