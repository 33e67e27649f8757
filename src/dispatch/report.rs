//! Per-test outcomes and run statistics

use crate::dispatch::config::Mode;
use std::fmt;
use std::time::Duration;

/// How a single test case ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The test body returned normally
    Passed,
    /// The test body panicked; the payload message is kept
    Panicked(String),
}

impl Status {
    pub fn is_passed(&self) -> bool {
        matches!(self, Status::Passed)
    }
}

/// Record of one executed test case
#[derive(Debug, Clone)]
pub struct TestOutcome {
    /// Position in the registry
    pub index: usize,
    /// Test name as registered
    pub name: String,
    /// Worker that ran the test (`None` for the calling thread)
    pub worker: Option<usize>,
    /// Whether the body returned or panicked
    pub status: Status,
    /// Wall time spent inside the body
    pub elapsed: Duration,
}

/// Work done by a single worker thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStatistics {
    pub worker_id: usize,
    /// Number of tests this worker claimed and executed
    pub executed: usize,
}

/// Result of dispatching a registry
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Mode the tests actually ran in
    pub mode: Mode,
    /// Worker threads spawned (0 for sequential runs and empty registries)
    pub workers: usize,
    /// One entry per registered test, ordered by registry index
    pub outcomes: Vec<TestOutcome>,
    /// Per-worker statistics, ordered by worker id
    pub worker_statistics: Vec<WorkerStatistics>,
    /// Total wall time of the run
    pub elapsed: Duration,
}

impl RunReport {
    /// Empty report for a run that executed nothing
    pub fn empty(mode: Mode) -> Self {
        Self {
            mode,
            workers: 0,
            outcomes: Vec::new(),
            worker_statistics: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Number of tests executed
    pub fn executed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_passed()).count()
    }

    /// Outcomes of tests that panicked
    pub fn panicked(&self) -> impl Iterator<Item = &TestOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_passed())
    }

    /// True when every executed test returned normally
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_passed())
    }

    /// Indices in the order they appear in `outcomes`
    pub fn indices(&self) -> Vec<usize> {
        self.outcomes.iter().map(|o| o.index).collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run Statistics:")?;
        writeln!(f, "  Mode: {}", self.mode)?;
        writeln!(f, "  Workers: {}", self.workers)?;
        writeln!(f, "  Elapsed time: {:?}", self.elapsed)?;
        writeln!(f, "  Tests executed: {}", self.executed())?;
        writeln!(f, "  Tests passed: {}", self.passed())?;
        for stats in &self.worker_statistics {
            writeln!(f, "  Worker {}: {} tests", stats.worker_id, stats.executed)?;
        }
        for outcome in self.panicked() {
            if let Status::Panicked(message) = &outcome.status {
                writeln!(f, "  FAILED {} (#{}): {}", outcome.name, outcome.index, message)?;
            }
        }
        Ok(())
    }
}
