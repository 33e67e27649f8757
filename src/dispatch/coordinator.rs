//! Dispatcher that runs every registered test exactly once.
//!
//! Sequential runs walk the registry in order on the calling thread. Parallel
//! runs spawn scoped worker threads that loop on the shared [`ClaimCursor`]:
//! claim an index, execute that test, claim again, and exit once the cursor
//! is past the end. The calling thread drains outcome messages while the
//! workers run and joins all of them before returning.

use crate::dispatch::channel::{WorkerChannel, WorkerMessage, create_channel, worker_channel};
use crate::dispatch::config::{DispatchConfig, Mode};
use crate::dispatch::cursor::ClaimCursor;
use crate::dispatch::report::{RunReport, Status, TestOutcome, WorkerStatistics};
use crate::error::DispatchError;
use crate::registry::{TestCase, TestRegistry};
use crossbeam_channel::Receiver;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Instant;

/// Runs a registry under a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    /// Execute every test in `registry` once and return when all are done.
    pub fn run(&self, registry: &TestRegistry) -> Result<RunReport, DispatchError> {
        match self.config.mode {
            Mode::Sequential => Ok(self.run_sequential(registry)),
            Mode::Parallel => self.run_parallel(registry),
        }
    }

    fn run_sequential(&self, registry: &TestRegistry) -> RunReport {
        let start_time = Instant::now();
        tracing::info!(tests = registry.len(), "running tests sequentially");

        let outcomes = registry
            .iter()
            .enumerate()
            .map(|(index, test)| execute(test, index, None, self.config.catch_panics))
            .collect();

        RunReport {
            mode: Mode::Sequential,
            workers: 0,
            outcomes,
            worker_statistics: Vec::new(),
            elapsed: start_time.elapsed(),
        }
    }

    fn run_parallel(&self, registry: &TestRegistry) -> Result<RunReport, DispatchError> {
        self.run_parallel_with(registry, |_| Ok(()))
    }

    /// Parallel run where `admit(worker_id)` is consulted before each spawn;
    /// an error from it is handled exactly like the OS refusing the thread.
    pub(crate) fn run_parallel_with<A>(
        &self,
        registry: &TestRegistry,
        admit: A,
    ) -> Result<RunReport, DispatchError>
    where
        A: Fn(usize) -> io::Result<()>,
    {
        let start_time = Instant::now();
        let total = registry.len();
        if total == 0 {
            return Ok(RunReport::empty(Mode::Parallel));
        }

        // No point in spawning workers that can never claim anything.
        let num_workers = self.config.requested_workers().min(total);
        let catch_panics = self.config.catch_panics;
        let cursor = ClaimCursor::new(total);
        let (tx, rx) = create_channel();

        tracing::info!(tests = total, workers = num_workers, "running tests in parallel");

        let (spawned, outcomes, worker_statistics) = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(num_workers);

            for worker_id in 0..num_workers {
                let channel = worker_channel(&tx, worker_id);
                let cursor = &cursor;
                let spawn = admit(worker_id).and_then(|()| {
                    thread::Builder::new()
                        .name(format!("mtrun-worker-{worker_id}"))
                        .spawn_scoped(scope, move || {
                            run_worker(registry, cursor, channel, catch_panics)
                        })
                });

                match spawn {
                    Ok(handle) => handles.push(handle),
                    Err(source) if handles.is_empty() => {
                        return Err(DispatchError::Spawn {
                            worker: worker_id,
                            source,
                        });
                    }
                    Err(err) => {
                        tracing::warn!(
                            worker = worker_id,
                            running = handles.len(),
                            "failed to spawn worker, continuing with fewer: {err}"
                        );
                        break;
                    }
                }
            }
            drop(tx);

            let spawned = handles.len();
            let (outcomes, worker_statistics) = collect(rx, total, spawned);

            // Join explicitly so a panic escaping a test resurfaces with its
            // own payload once every worker has stopped.
            let mut first_panic = None;
            for handle in handles {
                if let Err(payload) = handle.join() {
                    first_panic.get_or_insert(payload);
                }
            }
            if let Some(payload) = first_panic {
                panic::resume_unwind(payload);
            }

            Ok((spawned, outcomes, worker_statistics))
        })?;

        Ok(RunReport {
            mode: Mode::Parallel,
            workers: spawned,
            outcomes,
            worker_statistics,
            elapsed: start_time.elapsed(),
        })
    }
}

/// Run `registry` once, in parallel across one worker per logical CPU or
/// sequentially on the calling thread.
pub fn run(registry: &TestRegistry, parallel: bool) -> Result<RunReport, DispatchError> {
    Dispatcher::new(DispatchConfig::default().with_parallel(parallel)).run(registry)
}

/// Worker loop: claim, execute, repeat until the cursor runs out.
fn run_worker(
    registry: &TestRegistry,
    cursor: &ClaimCursor,
    channel: WorkerChannel,
    catch_panics: bool,
) -> usize {
    let mut executed = 0;

    while let Some(index) = cursor.claim() {
        let Some(test) = registry.get(index) else {
            break;
        };
        tracing::trace!(worker = channel.worker_id, index, "claimed test");
        channel.completed(execute(test, index, Some(channel.worker_id), catch_panics));
        executed += 1;
    }

    tracing::debug!(worker = channel.worker_id, executed, "worker finished");
    channel.finished(executed);
    executed
}

/// Drain worker messages until every worker has dropped its sender.
fn collect(
    rx: Receiver<WorkerMessage>,
    total: usize,
    workers: usize,
) -> (Vec<TestOutcome>, Vec<WorkerStatistics>) {
    let mut slots: Vec<Option<TestOutcome>> = vec![None; total];
    let mut worker_statistics = Vec::with_capacity(workers);

    for message in rx.iter() {
        match message {
            WorkerMessage::Completed(outcome) => {
                let index = outcome.index;
                debug_assert!(slots[index].is_none(), "test {index} executed twice");
                slots[index] = Some(outcome);
            }
            WorkerMessage::Finished {
                worker_id,
                executed,
            } => worker_statistics.push(WorkerStatistics {
                worker_id,
                executed,
            }),
        }
    }

    worker_statistics.sort_by_key(|s| s.worker_id);
    (slots.into_iter().flatten().collect(), worker_statistics)
}

/// Invoke one test inside its tracing span, optionally behind a panic boundary.
fn execute(test: &TestCase, index: usize, worker: Option<usize>, catch_panics: bool) -> TestOutcome {
    let span = tracing::debug_span!("test", name = test.name(), index, worker = ?worker);
    let _enter = span.enter();
    let start_time = Instant::now();

    let status = if catch_panics {
        match panic::catch_unwind(AssertUnwindSafe(|| test.invoke())) {
            Ok(()) => Status::Passed,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("test {} panicked: {}", test.name(), message);
                Status::Panicked(message)
            }
        }
    } else {
        test.invoke();
        Status::Passed
    };

    TestOutcome {
        index,
        name: test.name().to_string(),
        worker,
        status,
        elapsed: start_time.elapsed(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
