//! Test doubles for coordinator tests.
//!
//! Provides:
//! - A scripted [`RemoteCall`] with status cycling, injected errors, panics and delay
//! - Connectors that hand out a fixed remote or refuse to log in
//! - A reporter that keeps every event

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rpc_bench::{Reporter, RunEvent};
use rpc_client::{CallOutcome, Connector, RemoteCall, RpcError, RpcResult};
use serde_json::{Map, Value};

/// Remote whose behavior is fixed up front.
#[derive(Debug, Default)]
pub struct ScriptedRemote {
    /// Status codes cycled across calls; empty means 200.
    pub statuses: Vec<u16>,
    /// Zero-based call index that returns a transport error.
    pub fail_on: Option<u64>,
    /// Zero-based call index that panics.
    pub panic_on: Option<u64>,
    pub delay: Option<Duration>,
    calls: AtomicU64,
}

impl ScriptedRemote {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn with_statuses(statuses: &[u16]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, call: u64) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn panicking_on(mut self, call: u64) -> Self {
        self.panic_on = Some(call);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteCall for ScriptedRemote {
    async fn call(
        &self,
        _target: &str,
        _operation: &str,
        _args: &[Value],
        _kwargs: &Map<String, Value>,
    ) -> RpcResult<CallOutcome> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic_on == Some(n) {
            panic!("scripted panic on call {n}");
        }
        if self.fail_on == Some(n) {
            return Err(RpcError::Transport {
                message: "connection reset by peer".to_string(),
            });
        }

        let status = if self.statuses.is_empty() {
            200
        } else {
            self.statuses[(n as usize) % self.statuses.len()]
        };
        Ok(CallOutcome::from_status(status))
    }
}

/// Hands out the same remote on every connect.
pub struct StaticConnector(pub Arc<ScriptedRemote>);

#[async_trait]
impl Connector for StaticConnector {
    async fn connect(&self) -> RpcResult<Arc<dyn RemoteCall>> {
        Ok(self.0.clone())
    }
}

/// Always refuses the login.
pub struct RejectingConnector;

#[async_trait]
impl Connector for RejectingConnector {
    async fn connect(&self) -> RpcResult<Arc<dyn RemoteCall>> {
        Err(RpcError::LoginRejected {
            reason: "invalid credentials".to_string(),
        })
    }
}

/// Keeps every event it is handed.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub events: Vec<RunEvent>,
}

impl CollectingReporter {
    pub fn milestones(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Milestone { percentage, .. } => Some(*percentage),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for CollectingReporter {
    fn handle(&mut self, event: &RunEvent) -> std::io::Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Milestones rise by at least ten points, except a final 100.
pub fn assert_milestone_shape(milestones: &[u64]) {
    for pair in milestones.windows(2) {
        assert!(pair[1] > pair[0], "not increasing: {milestones:?}");
        if pair[1] != 100 {
            assert!(pair[1] - pair[0] >= 10, "step below ten: {milestones:?}");
        }
    }
    if let Some(first) = milestones.first() {
        assert!(*first >= 10 || *first == 100, "first below ten: {milestones:?}");
    }
}

/// Fails on the first milestone, as a closed stdout pipe would.
#[derive(Debug, Default)]
pub struct ClosedPipeReporter {
    pub handled: usize,
}

impl Reporter for ClosedPipeReporter {
    fn handle(&mut self, event: &RunEvent) -> std::io::Result<()> {
        self.handled += 1;
        match event {
            RunEvent::Milestone { .. } => Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "closed",
            )),
            _ => Ok(()),
        }
    }
}
