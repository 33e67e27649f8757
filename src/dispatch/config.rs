//! Configuration for test dispatch.

use crate::error::ConfigError;

/// Forces sequential execution when set to any value.
pub const ENV_NO_MT: &str = "MTRUN_NO_MT";
/// Overrides the number of worker threads.
pub const ENV_WORKERS: &str = "MTRUN_WORKERS";

/// Execution mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Every test on the calling thread, in registration order
    Sequential,
    /// Worker threads claiming tests through a shared cursor
    #[default]
    Parallel,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Sequential => write!(f, "sequential"),
            Mode::Parallel => write!(f, "parallel"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "single" | "serial" => Ok(Mode::Sequential),
            "parallel" | "mt" => Ok(Mode::Parallel),
            _ => Err(ConfigError::InvalidMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for a dispatch run.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Sequential or parallel execution.
    pub mode: Mode,
    /// Worker count override; `None` means one worker per logical CPU.
    pub workers: Option<usize>,
    /// Catch panics per test so the remaining tests still run.
    pub catch_panics: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Parallel,
            workers: None,
            catch_panics: true,
        }
    }
}

impl DispatchConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if lookup(ENV_NO_MT).is_some() {
            config.mode = Mode::Sequential;
        }

        if let Some(value) = lookup(ENV_WORKERS) {
            config.workers = Some(parse_workers(&value)?);
        }

        Ok(config)
    }

    /// Set the execution mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Select parallel (`true`) or sequential (`false`) execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.mode = if parallel {
            Mode::Parallel
        } else {
            Mode::Sequential
        };
        self
    }

    /// Override the number of worker threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Override the number of worker threads from an Option.
    pub fn with_workers_option(mut self, workers: Option<usize>) -> Self {
        self.workers = workers.map(|w| w.max(1));
        self
    }

    /// Enable or disable the per-test panic boundary.
    pub fn with_catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }

    /// Worker count before clamping to the number of tests.
    pub fn requested_workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Parse a positive worker count.
pub fn parse_workers(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidWorkers {
            value: value.to_string(),
        }),
    }
}
