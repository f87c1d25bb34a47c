//! Concurrent load generator for JSON-RPC model endpoints.
//!
//! This crate provides tools to:
//! - Split a request total into per-worker chunks
//! - Run workers concurrently against one authenticated session
//! - Report progress milestones and a final summary (text, table or JSON)

pub mod chunk;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod report;
pub mod timing;
pub mod worker;

pub use chunk::partition;
pub use config::{OutputFormat, RunConfig, DEFAULT_CALL_TIMEOUT};
pub use coordinator::{Coordinator, MilestoneTracker, RunState, MILESTONE_STEP};
pub use error::{BenchError, BenchResult};
pub use metrics::{CompletionReport, LatencyRecorder, LatencyStats, RunSummary};
pub use report::{reporter_for, JsonReporter, Reporter, RunEvent, TableReporter, TextReporter};
pub use timing::{timed, LapRecord, Timer};
pub use worker::{progress_interval, Worker};
