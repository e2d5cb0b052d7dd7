//! Background worker
//!
//! A [`Worker`] drives one [`Execution`] on a dedicated thread and publishes
//! every event it yields over a single-consumer `crossbeam` channel. The
//! consumer (usually the [`crate::coordinator::RunController`]) either polls
//! the channel or blocks on it.
//!
//! The channel holds at most [`EVENT_BUFFER`] messages. A consumer that stops
//! reading holds the thread back on its next send.
//!
//! # Lifecycle
//!
//! 1. **Spawn**: `Worker::spawn()` moves the execution onto a named thread
//! 2. **Run**: the thread pulls events and sends them, one message per event
//! 3. **Finish**: the thread exits after the terminal event, after a failure,
//!    or as soon as the receiving side has gone away
//!
//! Dropping the `Worker` cancels the execution and detaches the thread. The
//! thread notices either the cancel flag or the closed channel on its next
//! step, so no late event can reach a newer run.
//!
//! # Example
//!
//! ```
//! use hashsim::worker::{Worker, WorkerMessage};
//! use hashsim::engine::{CancelToken, Execution, RunEvent, Strategy};
//!
//! let execution = Execution::uniform(Strategy::Chaining, 10, 10, Some(1), CancelToken::new())?;
//! let worker = Worker::spawn(1, execution)?;
//!
//! let mut completed = false;
//! while let Ok(message) = worker.events().recv() {
//!     if let WorkerMessage::Event(RunEvent::Completed(result)) = message {
//!         assert_eq!(result.total_balls(), 10);
//!         completed = true;
//!     }
//! }
//! assert!(completed);
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

use crate::engine::{CancelToken, Execution, RunEvent};
use crate::error::EngineError;
use crate::Result;
use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};
use std::io;
use std::thread::{self, JoinHandle};

/// Messages a worker may queue before its consumer reads them
pub const EVENT_BUFFER: usize = 256;

/// Message published by a worker thread
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// An engine event, in the order the execution produced it
    Event(RunEvent),
    /// The execution failed; nothing follows
    Failed(EngineError),
}

/// Handle to a run executing on its own thread
pub struct Worker {
    /// Run identifier (monotonic per controller)
    id: u64,

    /// Shared with the execution on the worker thread
    cancel: CancelToken,

    /// Receiving side of the event channel
    events: Receiver<WorkerMessage>,

    /// Worker thread, `None` once joined
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Move `execution` onto a new thread and start it
    pub fn spawn(id: u64, execution: Execution) -> io::Result<Self> {
        Self::spawn_with_buffer(id, execution, EVENT_BUFFER)
    }

    fn spawn_with_buffer(id: u64, execution: Execution, buffer: usize) -> io::Result<Self> {
        let (tx, rx) = channel::bounded(buffer);
        let strategy = execution.strategy();
        let cancel = execution.cancel_token().clone();

        let handle = thread::Builder::new()
            .name(format!("hashsim-run-{}", id))
            .spawn(move || drive(id, execution, tx))?;

        debug!("run {}: worker started ({})", id, strategy);

        Ok(Self {
            id,
            cancel,
            events: rx,
            handle: Some(handle),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Event channel; disconnects once the worker thread exits
    pub fn events(&self) -> &Receiver<WorkerMessage> {
        &self.events
    }

    /// Request cancellation; the thread observes it on its next step
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the worker thread to exit
    pub fn join(mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("Worker thread for run {} panicked", self.id))?;
        }
        Ok(())
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Detach; the thread exits on the cancel flag or the closed channel
        if self.handle.is_some() {
            self.cancel.cancel();
        }
    }
}

/// Worker thread body; blocks while the channel is full
fn drive(id: u64, execution: Execution, tx: Sender<WorkerMessage>) {
    for event in execution {
        let message = match event {
            Ok(event) => WorkerMessage::Event(event),
            Err(e) => {
                warn!("run {}: failed: {}", id, e);
                let _ = tx.send(WorkerMessage::Failed(e));
                return;
            }
        };

        if tx.send(message).is_err() {
            debug!("run {}: receiver gone, stopping", id);
            return;
        }
    }
    debug!("run {}: worker finished", id);
}
