//! A queued batch followed by an exclusive batch.
//!
//! Queued tests go through the dispatcher and may run concurrently. Exclusive
//! tests touch process-wide state (display modes, foreground windows and the
//! like), so they always run afterwards, one at a time, on the calling thread
//! in registration order.

use crate::dispatch::{DispatchConfig, Dispatcher, Mode, RunReport};
use crate::error::DispatchError;
use crate::registry::TestRegistry;
use std::fmt;

#[derive(Debug, Default)]
pub struct Suite {
    queued: TestRegistry,
    exclusive: TestRegistry,
}

/// Reports for both batches of a suite run.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub queued: RunReport,
    pub exclusive: RunReport,
}

impl SuiteReport {
    pub fn executed(&self) -> usize {
        self.queued.executed() + self.exclusive.executed()
    }

    pub fn is_success(&self) -> bool {
        self.queued.is_success() && self.exclusive.is_success()
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Queued tests:")?;
        write!(f, "{}", self.queued)?;
        if self.exclusive.executed() > 0 {
            writeln!(f, "Exclusive tests:")?;
            write!(f, "{}", self.exclusive)?;
        }
        Ok(())
    }
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a test that may run alongside any other queued test.
    pub fn queue<F>(&mut self, name: impl Into<String>, body: F) -> usize
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.queued.register_named(name, body)
    }

    /// Add a test that must run with nothing else in flight.
    pub fn exclusive<F>(&mut self, name: impl Into<String>, body: F) -> usize
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.exclusive.register_named(name, body)
    }

    pub fn queued(&self) -> &TestRegistry {
        &self.queued
    }

    pub fn exclusive_tests(&self) -> &TestRegistry {
        &self.exclusive
    }

    /// Dispatch the queued batch under `config`, then the exclusive batch
    /// sequentially. The panic boundary setting applies to both.
    pub fn run(&self, config: &DispatchConfig) -> Result<SuiteReport, DispatchError> {
        let queued = Dispatcher::new(config.clone()).run(&self.queued)?;

        let exclusive_config = config.clone().with_mode(Mode::Sequential);
        let exclusive = Dispatcher::new(exclusive_config).run(&self.exclusive)?;

        Ok(SuiteReport { queued, exclusive })
    }
}
