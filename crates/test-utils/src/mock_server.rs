//! In-process JSON-RPC server that imitates the login and model-call endpoints.
//!
//! Binds to an ephemeral port on 127.0.0.1, answers `common.login` according to
//! [`LoginBehavior`], and answers every other method with the next status code
//! from a cycling list. Every request body is recorded for later assertions.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

/// How the server answers `common.login`.
#[derive(Debug, Clone)]
pub enum LoginBehavior {
    /// Return the configured session token.
    Accept,
    /// Respond with the given HTTP status.
    RejectStatus(u16),
    /// Respond 200 with `"result": false`.
    RejectResult,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub login: LoginBehavior,
    /// Status codes for model calls, cycled in order.
    pub call_statuses: Vec<u16>,
    /// Artificial latency added to every model call.
    pub call_delay: Option<Duration>,
    pub session: (Value, Value),
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            login: LoginBehavior::Accept,
            call_statuses: vec![200],
            call_delay: None,
            session: (json!(1), json!("mock-session")),
        }
    }
}

impl MockBehavior {
    pub fn with_login(mut self, login: LoginBehavior) -> Self {
        self.login = login;
        self
    }

    pub fn with_call_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.call_statuses = statuses;
        self
    }

    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }
}

/// A request seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub database: String,
    pub body: Value,
}

impl RecordedRequest {
    pub fn method(&self) -> Option<&str> {
        self.body.get("method").and_then(Value::as_str)
    }
}

struct MockState {
    behavior: MockBehavior,
    calls: AtomicU64,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Running mock server. Aborted on drop.
pub struct MockRpcServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockRpcServer {
    /// Start a server with default behavior (accept login, every call 200).
    pub async fn start() -> Self {
        Self::start_with(MockBehavior::default()).await
    }

    pub async fn start_with(behavior: MockBehavior) -> Self {
        let state = Arc::new(MockState {
            behavior,
            calls: AtomicU64::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/:database", post(handle_rpc))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Mock server has no address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL including scheme, e.g. `http://127.0.0.1:40123`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL without scheme, as a user would type it on the command line.
    pub fn host_port(&self) -> String {
        self.addr.to_string()
    }

    /// Number of model calls (not logins) served.
    pub fn call_count(&self) -> u64 {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Recorded model calls, excluding logins.
    pub fn call_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method() != Some("common.login"))
            .collect()
    }
}

impl Drop for MockRpcServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_rpc(
    State(state): State<Arc<MockState>>,
    Path(database): Path<String>,
    body: String,
) -> Response {
    let body: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid JSON").into_response(),
    };

    let is_login = body.get("method").and_then(Value::as_str) == Some("common.login");

    if let Ok(mut requests) = state.requests.lock() {
        requests.push(RecordedRequest {
            database,
            body: body.clone(),
        });
    }

    if is_login {
        return match &state.behavior.login {
            LoginBehavior::Accept => {
                let (a, b) = &state.behavior.session;
                Json(json!({"id": null, "result": [a, b]})).into_response()
            }
            LoginBehavior::RejectStatus(code) => status_response(*code),
            LoginBehavior::RejectResult => Json(json!({"id": null, "result": false})).into_response(),
        };
    }

    let n = state.calls.fetch_add(1, Ordering::SeqCst) as usize;

    if let Some(delay) = state.behavior.call_delay {
        tokio::time::sleep(delay).await;
    }

    let statuses = &state.behavior.call_statuses;
    let code = if statuses.is_empty() {
        200
    } else {
        statuses[n % statuses.len()]
    };

    status_response(code)
}

fn status_response(code: u16) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"id": null, "result": []}))).into_response()
}
