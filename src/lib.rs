//! Parallel test-case dispatcher.
//!
//! Test cases are registered into a [`TestRegistry`] and then run exactly
//! once each, either sequentially in registration order or across worker
//! threads that claim tests through a shared atomic cursor. See
//! [`dispatch`] for the execution model and [`Suite`] for running a batch
//! of tests that must not overlap with anything else.

pub mod check;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod suite;

pub use check::{CheckSummary, Checks};
pub use dispatch::{DispatchConfig, Dispatcher, Mode, RunReport, run};
pub use error::{ConfigError, DispatchError};
pub use registry::{TestCase, TestRegistry};
pub use suite::{Suite, SuiteReport};
