//! Connection settings for the target server.

use std::time::Duration;

use crate::error::{RpcError, RpcResult};

/// Where and how to reach the JSON-RPC endpoint.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server base URL. A missing scheme defaults to `http://`.
    pub url: String,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Per-request timeout applied by the HTTP client.
    pub timeout: Duration,
    /// Idle connections kept per host; usually the worker count.
    pub pool_size: usize,
}

impl ClientConfig {
    pub fn new(
        url: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            user: user.into(),
            password: password.into(),
            timeout: Duration::from_secs(30),
            pool_size: 1,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Full endpoint URL: `{url}/{database}`.
    pub fn endpoint(&self) -> RpcResult<String> {
        let base = self.url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(RpcError::InvalidUrl("empty URL".to_string()));
        }
        let database = self.database.trim_matches('/');
        if database.is_empty() {
            return Err(RpcError::InvalidUrl("empty database name".to_string()));
        }

        let base = if base.contains("://") {
            base.to_string()
        } else {
            format!("http://{}", base)
        };

        Ok(format!("{}/{}", base, database))
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}
