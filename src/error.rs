//! Error types for configuration and dispatch

use std::io;
use thiserror::Error;

/// Errors raised while building a dispatch configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Worker count was zero or not a number.
    #[error("invalid worker count '{value}': expected a positive integer")]
    InvalidWorkers { value: String },
    /// Mode name did not match any known execution mode.
    #[error("unknown dispatch mode '{value}'. Valid options: sequential, parallel")]
    InvalidMode { value: String },
}

/// Errors raised while dispatching registered test cases.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The OS refused to create a worker thread and no worker was running yet.
    #[error("failed to spawn worker thread {worker}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },
}
