//! Error types for the JSON-RPC client.

use thiserror::Error;

/// Result type alias using RpcError.
pub type RpcResult<T> = Result<T, RpcError>;

/// Errors raised while talking to the RPC endpoint.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    // === Configuration Errors ===
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // === Transport Errors ===
    #[error("Request timed out")]
    Timeout,

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    // === Protocol Errors ===
    #[error("Login rejected: {reason}")]
    LoginRejected { reason: String },

    #[error("Login response did not contain a two-element session token")]
    MalformedSession,

    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

impl RpcError {
    /// Returns the error category as a static string for log fields.
    pub fn category(&self) -> &'static str {
        match self {
            RpcError::InvalidUrl(_) | RpcError::ClientBuild(_) => "config",
            RpcError::Timeout => "timeout",
            RpcError::Connection { .. } => "connection",
            RpcError::Transport { .. } => "transport",
            RpcError::LoginRejected { .. } | RpcError::MalformedSession => "login",
            RpcError::Decode { .. } => "decode",
        }
    }

    /// Classify a [`reqwest::Error`] into the matching variant.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            RpcError::Timeout
        } else if err.is_connect() {
            RpcError::Connection {
                message: err.to_string(),
            }
        } else if err.is_builder() {
            RpcError::InvalidUrl(err.to_string())
        } else {
            RpcError::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Decode {
            message: err.to_string(),
        }
    }
}
