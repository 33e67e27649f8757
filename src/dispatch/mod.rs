//! Test dispatch: running every registered test case exactly once.
//!
//! # Architecture
//!
//! The dispatch system consists of:
//! - A **claim cursor**, the single atomic index workers take tests from
//! - A **coordinator** that spawns scoped workers, or runs the registry
//!   sequentially on the calling thread, and joins everything before returning
//! - A **channel** carrying per-test outcomes from workers to the coordinator
//! - A **report** aggregating outcomes and per-worker statistics
//!
//! # Example
//!
//! ```
//! use mtrun::dispatch::{DispatchConfig, Dispatcher};
//! use mtrun::TestRegistry;
//!
//! let mut registry = TestRegistry::new();
//! registry.register_named("adapter_desc", || assert_eq!(2 + 2, 4));
//! registry.register_named("private_data", || {});
//!
//! let config = DispatchConfig::default().with_workers(2);
//! let report = Dispatcher::new(config).run(&registry).unwrap();
//! assert_eq!(report.executed(), 2);
//! assert!(report.is_success());
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod cursor;
pub mod report;

pub use config::{DispatchConfig, Mode};
pub use coordinator::{Dispatcher, run};
pub use cursor::ClaimCursor;
pub use report::{RunReport, Status, TestOutcome, WorkerStatistics};
