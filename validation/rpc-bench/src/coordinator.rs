//! Run orchestration: split the load, launch workers, collect their reports.

use std::fmt;
use std::sync::Arc;

use rpc_client::Connector;
use scenarios::Scenario;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chunk::partition;
use crate::config::RunConfig;
use crate::error::{BenchError, BenchResult};
use crate::metrics::{requests_per_second, CompletionReport, LatencyRecorder, RunSummary};
use crate::report::{Reporter, RunEvent};
use crate::timing::LapRecord;
use crate::worker::Worker;

/// Minimum advance, in percentage points, between two milestones.
pub const MILESTONE_STEP: u64 = 10;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Launching,
    Collecting,
    Aggregating,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Launching => "launching",
            RunState::Collecting => "collecting",
            RunState::Aggregating => "aggregating",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Turns a stream of progress increments into milestone percentages.
#[derive(Debug, Clone)]
pub struct MilestoneTracker {
    total: u64,
    completed: u64,
    last_reported: u64,
}

impl MilestoneTracker {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            completed: 0,
            last_reported: 0,
        }
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Add `increment` completed calls and return the percentage if it is a milestone.
    ///
    /// A milestone is at least [`MILESTONE_STEP`] points past the previous one, except
    /// that reaching 100% is always reported once.
    pub fn advance(&mut self, increment: u64) -> Option<u64> {
        if self.total == 0 {
            return None;
        }
        self.completed = self.completed.saturating_add(increment);

        let percentage =
            (u128::from(self.completed) * 100 / u128::from(self.total)).min(100) as u64;
        let stepped = percentage >= self.last_reported + MILESTONE_STEP;
        let finished = percentage == 100 && self.last_reported < 100;

        if stepped || finished {
            self.last_reported = percentage;
            Some(percentage)
        } else {
            None
        }
    }
}

/// Drives one benchmark run from login to summary.
pub struct Coordinator {
    config: RunConfig,
    scenario: Arc<dyn Scenario>,
    cancel: CancellationToken,
    state: RunState,
}

impl Coordinator {
    pub fn new(config: RunConfig, scenario: Arc<dyn Scenario>) -> Self {
        Self {
            config,
            scenario,
            cancel: CancellationToken::new(),
            state: RunState::Idle,
        }
    }

    /// Use an externally owned token, e.g. one cancelled on Ctrl+C.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        info!(from = %self.state, to = %next, "Run state changed");
        self.state = next;
    }

    /// Execute the run and return the aggregated summary.
    pub async fn run(
        &mut self,
        connector: &dyn Connector,
        reporter: &mut dyn Reporter,
    ) -> BenchResult<RunSummary> {
        let chunks = match self
            .config
            .validate()
            .and_then(|_| partition(self.config.requests, self.config.connections))
        {
            Ok(chunks) => chunks,
            Err(e) => {
                self.transition(RunState::Failed);
                return Err(e);
            }
        };

        let remote = match connector.connect().await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, category = e.category(), "Login failed");
                self.transition(RunState::Failed);
                return Err(BenchError::Login(e));
            }
        };

        self.transition(RunState::Launching);
        let started = RunEvent::Started {
            target: self.config.target.clone(),
            scenario: self.scenario.name().to_string(),
            requests: self.config.requests,
            connections: self.config.connections,
        };
        if let Err(e) = reporter.handle(&started) {
            return Err(self.abort(Vec::new(), e.into()).await);
        }

        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<u64>();
        let (completion_tx, mut completion_rx) = mpsc::unbounded_channel::<CompletionReport>();
        let mut lap = LapRecord::new();

        let handles: Vec<_> = chunks
            .iter()
            .enumerate()
            .map(|(id, &chunk_size)| {
                Worker {
                    id,
                    chunk_size,
                    scenario: Arc::clone(&self.scenario),
                    remote: Arc::clone(&remote),
                    call_timeout: self.config.call_timeout,
                    cancel: self.cancel.clone(),
                }
                .spawn(progress_tx.clone(), completion_tx.clone())
            })
            .collect();
        drop(progress_tx);
        drop(completion_tx);
        debug!(workers = handles.len(), "Workers spawned");

        self.transition(RunState::Collecting);
        let collected = collect(
            chunks.len(),
            MilestoneTracker::new(self.config.requests),
            &mut lap,
            &mut progress_rx,
            &mut completion_rx,
            reporter,
        )
        .await;
        let reports = match collected {
            Ok(reports) => reports,
            Err(e) => return Err(self.abort(handles, e).await),
        };

        self.transition(RunState::Aggregating);
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker task did not complete cleanly");
            }
        }

        let mut latency = LatencyRecorder::new();
        let (mut successful, mut failed) = (0u64, 0u64);
        for report in &reports {
            successful += report.success;
            failed += report.failure;
            latency.merge(&report.latency);
        }

        let actual = successful + failed;
        if actual != self.config.requests {
            self.transition(RunState::Failed);
            return Err(BenchError::TallyMismatch {
                expected: self.config.requests,
                actual,
            });
        }

        lap.note();
        let elapsed = lap.elapsed();
        let summary = RunSummary {
            timestamp: chrono::Utc::now().to_rfc3339(),
            scenario: self.scenario.name().to_string(),
            target: self.config.target.clone(),
            requests: self.config.requests,
            connections: self.config.connections,
            successful,
            failed,
            elapsed_secs: elapsed.as_secs_f64(),
            requests_per_second: requests_per_second(latency.len(), elapsed),
            latency: latency.stats(),
            cancelled: self.cancel.is_cancelled(),
        };

        info!(
            successful,
            failed,
            elapsed_secs = summary.elapsed_secs,
            "Run complete"
        );
        if let Err(e) = reporter.handle(&RunEvent::Finished(summary.clone())) {
            return Err(self.abort(Vec::new(), e.into()).await);
        }
        self.transition(RunState::Done);

        Ok(summary)
    }

    /// Stop every worker, wait for them and mark the run failed.
    async fn abort(&mut self, handles: Vec<JoinHandle<()>>, err: BenchError) -> BenchError {
        warn!(error = %err, "Run aborted, stopping workers");
        self.cancel.cancel();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker task did not complete cleanly");
            }
        }
        self.transition(RunState::Failed);
        err
    }
}

/// Consume progress and reports until every worker has reported and all progress
/// has been drained.
async fn collect(
    workers: usize,
    mut tracker: MilestoneTracker,
    lap: &mut LapRecord,
    progress_rx: &mut UnboundedReceiver<u64>,
    completion_rx: &mut UnboundedReceiver<CompletionReport>,
    reporter: &mut dyn Reporter,
) -> BenchResult<Vec<CompletionReport>> {
    let mut reports = Vec::with_capacity(workers);

    while reports.len() < workers {
        tokio::select! {
            Some(increment) = progress_rx.recv() => {
                emit_milestone(&mut tracker, lap, increment, reporter)?;
            }
            report = completion_rx.recv() => match report {
                Some(report) => {
                    debug!(
                        worker = report.worker,
                        success = report.success,
                        failure = report.failure,
                        "Worker finished"
                    );
                    reports.push(report);
                }
                None => break,
            },
        }
    }

    // Reports can overtake the last progress increments of their worker.
    while let Some(increment) = progress_rx.recv().await {
        emit_milestone(&mut tracker, lap, increment, reporter)?;
    }

    Ok(reports)
}

fn emit_milestone(
    tracker: &mut MilestoneTracker,
    lap: &mut LapRecord,
    increment: u64,
    reporter: &mut dyn Reporter,
) -> BenchResult<()> {
    if let Some(percentage) = tracker.advance(increment) {
        lap.note();
        reporter.handle(&RunEvent::Milestone {
            percentage,
            elapsed_secs: lap.elapsed().as_secs_f64(),
            lap_secs: lap.last().as_secs_f64(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(total: u64, increments: &[u64]) -> Vec<u64> {
        let mut tracker = MilestoneTracker::new(total);
        increments
            .iter()
            .filter_map(|&inc| tracker.advance(inc))
            .collect()
    }

    #[test]
    fn test_milestones_every_ten_percent() {
        assert_eq!(
            replay(100, &[10; 10]),
            vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]
        );
    }

    #[test]
    fn test_small_steps_are_coalesced() {
        let milestones = replay(100, &[3; 33]);
        assert_eq!(milestones, vec![12, 24, 36, 48, 60, 72, 84, 96]);
    }

    #[test]
    fn test_final_hundred_is_always_reported() {
        let mut increments = vec![3; 33];
        increments.push(1);
        let milestones = replay(100, &increments);
        assert_eq!(milestones.last(), Some(&100));
        assert_eq!(milestones[milestones.len() - 2], 96);
    }

    #[test]
    fn test_single_increment_jumps_to_hundred() {
        assert_eq!(replay(7, &[7]), vec![100]);
    }

    #[test]
    fn test_hundred_reported_once() {
        let mut tracker = MilestoneTracker::new(10);
        assert_eq!(tracker.advance(10), Some(100));
        assert_eq!(tracker.advance(0), None);
        assert_eq!(tracker.completed(), 10);
    }

    #[test]
    fn test_floor_percentage() {
        // 95 calls: 9 of them is 9.47%, not a milestone yet.
        let mut tracker = MilestoneTracker::new(95);
        assert_eq!(tracker.advance(9), None);
        assert_eq!(tracker.advance(1), Some(10));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RunState::Collecting.to_string(), "collecting");
        assert_eq!(RunState::Failed.to_string(), "failed");
    }
}
