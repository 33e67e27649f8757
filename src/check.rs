//! Soft assertions shared between test cases.
//!
//! A failed check is counted and logged but does not unwind, so the test case
//! carries on and the dispatcher moves to the next claim as usual. One
//! `Checks` tally is typically shared by every test case of a run through an
//! `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for checks recorded during a run.
#[derive(Debug, Default)]
pub struct Checks {
    passed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    todo: AtomicU64,
}

/// Point-in-time copy of a [`Checks`] tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub todo: u64,
}

impl CheckSummary {
    /// True when no check failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of recorded checks, skips included.
    pub fn total(&self) -> u64 {
        self.passed + self.failed + self.skipped + self.todo
    }
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a check. Returns `condition` so callers can branch on it.
    pub fn ok(&self, condition: bool, message: impl AsRef<str>) -> bool {
        if condition {
            self.passed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!("check failed: {}", message.as_ref());
        }
        condition
    }

    /// Record that part of a test was skipped.
    pub fn skip(&self, message: impl AsRef<str>) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        tracing::info!("skipped: {}", message.as_ref());
    }

    /// Record a check that is known to fail.
    ///
    /// A false condition is counted as `todo`. A true one means the known
    /// failure has been fixed and is counted as a failure so the marker gets
    /// removed.
    pub fn todo(&self, condition: bool, message: impl AsRef<str>) -> bool {
        if condition {
            self.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!("test succeeded inside todo block: {}", message.as_ref());
        } else {
            self.todo.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("todo: {}", message.as_ref());
        }
        condition
    }

    pub fn summary(&self) -> CheckSummary {
        CheckSummary {
            passed: self.passed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            todo: self.todo.load(Ordering::Relaxed),
        }
    }
}
