//! Run configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

/// Default per-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Shape of one benchmark run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Human-readable target, e.g. `http://localhost:8000/tryton`.
    pub target: String,
    /// Total calls across all workers.
    pub requests: u64,
    /// Number of concurrent workers.
    pub connections: u64,
    /// Upper bound on a single call.
    pub call_timeout: Duration,
}

impl RunConfig {
    pub fn new(target: impl Into<String>, requests: u64, connections: u64) -> Self {
        Self {
            target: target.into(),
            requests,
            connections,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> BenchResult<()> {
        if self.requests == 0 {
            return Err(BenchError::InvalidConfig("requests must be > 0".to_string()));
        }
        if self.connections == 0 {
            return Err(BenchError::InvalidConfig(
                "connections must be > 0".to_string(),
            ));
        }
        if self.connections > self.requests {
            return Err(BenchError::InvalidConfig(format!(
                "connections ({}) must not exceed requests ({})",
                self.connections, self.requests
            )));
        }
        if self.call_timeout.is_zero() {
            return Err(BenchError::InvalidConfig(
                "call timeout must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Progress lines and a three-line summary
    #[default]
    Text,
    /// Progress lines and a summary table with latency percentiles
    Table,
    /// One JSON object per run event
    Json,
}
