//! Login handshake and model calls over HTTP.
//!
//! Wire format:
//! - login: `{"jsonrpc": "2.0", "method": "common.login", "params": [user, password], "id": null}`
//! - call: `{"method": "model.<target>.<operation>", "params": [s0, s1, ...args, kwargs], "id": null}`
//!
//! Keyword arguments are appended as the last positional element of `params`.
//! Servers that expect named parameters will not see them as such; the format is
//! kept as-is for compatibility with existing scenarios.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, trace};

use crate::config::ClientConfig;
use crate::error::{RpcError, RpcResult};
use crate::outcome::CallOutcome;

/// Opaque token pair returned by `common.login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken(pub Value, pub Value);

/// Executes one model call and classifies the response.
#[async_trait]
pub trait RemoteCall: Send + Sync {
    async fn call(
        &self,
        target: &str,
        operation: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> RpcResult<CallOutcome>;
}

/// Produces an authenticated [`RemoteCall`] handle.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> RpcResult<Arc<dyn RemoteCall>>;
}

/// Build the `common.login` request body.
pub fn login_request(user: &str, password: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "common.login",
        "params": [user, password],
        "id": null,
    })
}

/// Build a `model.<target>.<operation>` request body.
pub fn call_request(
    token: &SessionToken,
    target: &str,
    operation: &str,
    args: &[Value],
    kwargs: &Map<String, Value>,
) -> Value {
    let mut params = Vec::with_capacity(args.len() + 3);
    params.push(token.0.clone());
    params.push(token.1.clone());
    params.extend(args.iter().cloned());
    params.push(Value::Object(kwargs.clone()));

    json!({
        "method": format!("model.{}.{}", target, operation),
        "params": params,
        "id": null,
    })
}

/// Extract the session token from a login reply.
pub fn parse_login_reply(reply: &Value) -> RpcResult<SessionToken> {
    if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
        return Err(RpcError::LoginRejected {
            reason: error.to_string(),
        });
    }

    match reply.get("result") {
        Some(Value::Array(items)) if items.len() == 2 => {
            Ok(SessionToken(items[0].clone(), items[1].clone()))
        }
        Some(Value::Bool(false)) => Err(RpcError::LoginRejected {
            reason: "invalid credentials".to_string(),
        }),
        _ => Err(RpcError::MalformedSession),
    }
}

/// HTTP client bound to one endpoint, not yet authenticated.
pub struct RpcClient {
    http: Client,
    endpoint: String,
    config: ClientConfig,
}

impl RpcClient {
    pub fn new(config: ClientConfig) -> RpcResult<Self> {
        let endpoint = config.endpoint()?;
        let http = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_size)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| RpcError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Perform the login handshake and return a ready session.
    #[instrument(skip(self), fields(endpoint = %self.endpoint, user = %self.config.user))]
    pub async fn login(self) -> RpcResult<Session> {
        let body = login_request(&self.config.user, &self.config.password);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::from_reqwest(&e))?;

        let status = response.status().as_u16();
        if CallOutcome::from_status(status).is_failure() {
            return Err(RpcError::LoginRejected {
                reason: format!("HTTP {}", status),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| RpcError::from_reqwest(&e))?;
        let reply: Value = serde_json::from_str(&text)?;
        let token = parse_login_reply(&reply)?;

        info!("Login succeeded");

        Ok(Session {
            http: self.http,
            endpoint: self.endpoint,
            token,
        })
    }
}

/// Authenticated handle shared by all workers.
#[derive(Clone)]
pub struct Session {
    http: Client,
    endpoint: String,
    token: SessionToken,
}

impl Session {
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteCall for Session {
    async fn call(
        &self,
        target: &str,
        operation: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> RpcResult<CallOutcome> {
        let body = call_request(&self.token, target, operation, args, kwargs);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::from_reqwest(&e))?;

        let status = response.status().as_u16();

        // Drain the body so the connection goes back to the pool.
        match response.bytes().await {
            Ok(bytes) => trace!(status, bytes = bytes.len(), "Call finished"),
            Err(e) => debug!(status, error = %e, "Failed to read response body"),
        }

        Ok(CallOutcome::from_status(status))
    }
}

#[async_trait]
impl Connector for ClientConfig {
    async fn connect(&self) -> RpcResult<Arc<dyn RemoteCall>> {
        let session = RpcClient::new(self.clone())?.login().await?;
        Ok(Arc::new(session))
    }
}
