//! Error types for benchmark runs.

use rpc_client::RpcError;
use thiserror::Error;

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Login failed: {0}")]
    Login(#[source] RpcError),

    #[error("Tally mismatch: expected {expected} requests, workers reported {actual}")]
    TallyMismatch { expected: u64, actual: u64 },

    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),
}
