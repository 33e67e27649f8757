//! Outcome channel between dispatch workers and the calling thread.

use crate::dispatch::report::TestOutcome;
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Message sent from a worker to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Worker executed one test.
    Completed(TestOutcome),
    /// Worker found the cursor exhausted and is exiting.
    Finished { worker_id: usize, executed: usize },
}

/// Channel endpoints for a worker.
#[derive(Debug, Clone)]
pub struct WorkerChannel {
    pub worker_id: usize,
    /// Send messages to the coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
}

impl WorkerChannel {
    /// Report a finished test. A closed channel means the coordinator is gone
    /// and nobody is left to read the outcome.
    pub fn completed(&self, outcome: TestOutcome) {
        let _ = self.to_coordinator.send(WorkerMessage::Completed(outcome));
    }

    /// Report that this worker ran out of work.
    pub fn finished(&self, executed: usize) {
        let _ = self.to_coordinator.send(WorkerMessage::Finished {
            worker_id: self.worker_id,
            executed,
        });
    }
}

/// Create the worker-to-coordinator channel.
///
/// Worker endpoints are cloned from the returned sender as threads are
/// spawned. The caller drops its own sender once spawning is done so the
/// receiver disconnects when the last worker exits.
pub fn create_channel() -> (Sender<WorkerMessage>, Receiver<WorkerMessage>) {
    // Unbounded: workers never block on reporting
    unbounded()
}

/// Endpoint for worker `worker_id`.
pub fn worker_channel(tx: &Sender<WorkerMessage>, worker_id: usize) -> WorkerChannel {
    WorkerChannel {
        worker_id,
        to_coordinator: tx.clone(),
    }
}
