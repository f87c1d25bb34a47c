//! One unit of load: executes a chunk of calls and reports how they went.

use std::sync::Arc;
use std::time::Duration;

use rpc_client::{CallOutcome, RemoteCall};
use scenarios::Scenario;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::metrics::{CompletionReport, LatencyRecorder};
use crate::timing::timed;

/// Calls between progress increments for a chunk; zero means report only at the end.
pub fn progress_interval(chunk_size: u64) -> u64 {
    chunk_size / 10
}

/// Everything a worker needs to run its chunk.
pub struct Worker {
    pub id: usize,
    pub chunk_size: u64,
    pub scenario: Arc<dyn Scenario>,
    pub remote: Arc<dyn RemoteCall>,
    pub call_timeout: Duration,
    pub cancel: CancellationToken,
}

impl Worker {
    /// Spawn the worker on the runtime.
    ///
    /// The tally is created before spawning, so the completion report is sent even
    /// if the task is dropped before it is first polled.
    pub fn spawn(
        self,
        progress: UnboundedSender<u64>,
        completion: UnboundedSender<CompletionReport>,
    ) -> JoinHandle<()> {
        let tally = Tally::new(self.id, self.chunk_size, progress, completion);
        tokio::spawn(self.run(tally))
    }

    async fn run(self, mut tally: Tally) {
        let target = self.scenario.target();
        let operation = self.scenario.operation();

        for _ in 0..self.chunk_size {
            if self.cancel.is_cancelled() {
                break;
            }

            let payload = self.scenario.generate();
            let call = timed(tokio::time::timeout(
                self.call_timeout,
                self.remote
                    .call(target, operation, &payload.args, &payload.kwargs),
            ));

            let (result, latency) = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                finished = call => finished,
            };

            let outcome = match result {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    debug!(worker = self.id, error = %e, category = e.category(), "Call failed");
                    CallOutcome::Failure
                }
                Err(_) => {
                    debug!(worker = self.id, timeout = ?self.call_timeout, "Call timed out");
                    CallOutcome::Failure
                }
            };

            tally.record(outcome, latency);
        }

        if tally.attempted() < self.chunk_size {
            info!(
                worker = self.id,
                attempted = tally.attempted(),
                chunk = self.chunk_size,
                "Worker cancelled"
            );
        }

        tally.finish();
    }
}

/// Local counters plus the two outbound channels.
///
/// Finishing sends the final progress increment and the completion report; `Drop`
/// finishes a tally that was not finished explicitly, which covers panics and
/// aborted tasks. Calls never attempted are counted as failures.
struct Tally {
    worker: usize,
    chunk_size: u64,
    interval: u64,
    success: u64,
    failure: u64,
    unreported: u64,
    latency: LatencyRecorder,
    progress: UnboundedSender<u64>,
    completion: Option<UnboundedSender<CompletionReport>>,
}

impl Tally {
    fn new(
        worker: usize,
        chunk_size: u64,
        progress: UnboundedSender<u64>,
        completion: UnboundedSender<CompletionReport>,
    ) -> Self {
        Self {
            worker,
            chunk_size,
            interval: progress_interval(chunk_size),
            success: 0,
            failure: 0,
            unreported: 0,
            latency: LatencyRecorder::new(),
            progress,
            completion: Some(completion),
        }
    }

    fn attempted(&self) -> u64 {
        self.success + self.failure
    }

    fn record(&mut self, outcome: CallOutcome, latency: Duration) {
        match outcome {
            CallOutcome::Success => self.success += 1,
            CallOutcome::Failure => self.failure += 1,
        }
        self.latency.record(latency);
        self.unreported += 1;

        if self.interval > 0 && self.unreported >= self.interval {
            let _ = self.progress.send(self.unreported);
            self.unreported = 0;
        }
    }

    fn finish(&mut self) {
        let Some(completion) = self.completion.take() else {
            return;
        };

        let remaining = self.chunk_size.saturating_sub(self.attempted());
        self.failure += remaining;
        self.unreported += remaining;

        if self.unreported > 0 {
            let _ = self.progress.send(self.unreported);
            self.unreported = 0;
        }

        let report = CompletionReport {
            worker: self.worker,
            chunk_size: self.chunk_size,
            success: self.success,
            failure: self.failure,
            latency: std::mem::take(&mut self.latency),
        };
        let _ = completion.send(report);
    }
}

impl Drop for Tally {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn channels() -> (
        UnboundedSender<u64>,
        mpsc::UnboundedReceiver<u64>,
        UnboundedSender<CompletionReport>,
        mpsc::UnboundedReceiver<CompletionReport>,
    ) {
        let (ptx, prx) = mpsc::unbounded_channel();
        let (ctx, crx) = mpsc::unbounded_channel();
        (ptx, prx, ctx, crx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<u64>) -> Vec<u64> {
        let mut out = Vec::new();
        while let Ok(v) = rx.try_recv() {
            out.push(v);
        }
        out
    }

    #[test]
    fn test_progress_interval() {
        assert_eq!(progress_interval(100), 10);
        assert_eq!(progress_interval(14), 1);
        assert_eq!(progress_interval(10), 1);
        assert_eq!(progress_interval(9), 0);
        assert_eq!(progress_interval(1), 0);
    }

    #[test]
    fn test_tally_cadence() {
        let (ptx, mut prx, ctx, mut crx) = channels();
        let mut tally = Tally::new(0, 25, ptx, ctx);
        for _ in 0..25 {
            tally.record(CallOutcome::Success, Duration::from_millis(1));
        }
        tally.finish();

        assert_eq!(drain(&mut prx), vec![2; 12].into_iter().chain([1]).collect::<Vec<_>>());
        let report = crx.try_recv().unwrap();
        assert_eq!(report.success, 25);
        assert!(report.is_balanced());
    }

    #[test]
    fn test_small_chunk_reports_once() {
        let (ptx, mut prx, ctx, mut crx) = channels();
        let mut tally = Tally::new(3, 7, ptx, ctx);
        for i in 0..7 {
            let outcome = if i % 2 == 0 {
                CallOutcome::Success
            } else {
                CallOutcome::Failure
            };
            tally.record(outcome, Duration::from_millis(1));
        }
        assert!(drain(&mut prx).is_empty());
        tally.finish();

        assert_eq!(drain(&mut prx), vec![7]);
        let report = crx.try_recv().unwrap();
        assert_eq!(report.worker, 3);
        assert_eq!((report.success, report.failure), (4, 3));
    }

    #[test]
    fn test_drop_counts_remainder_as_failures() {
        let (ptx, mut prx, ctx, mut crx) = channels();
        {
            let mut tally = Tally::new(1, 20, ptx, ctx);
            for _ in 0..5 {
                tally.record(CallOutcome::Success, Duration::from_millis(1));
            }
        }

        assert_eq!(drain(&mut prx).iter().sum::<u64>(), 20);
        let report = crx.try_recv().unwrap();
        assert_eq!(report.success, 5);
        assert_eq!(report.failure, 15);
        assert!(report.is_balanced());
        assert!(crx.try_recv().is_err(), "exactly one report");
    }

    #[test]
    fn test_finish_is_idempotent() {
        let (ptx, mut prx, ctx, mut crx) = channels();
        let mut tally = Tally::new(0, 3, ptx, ctx);
        tally.finish();
        tally.finish();
        drop(tally);

        assert_eq!(drain(&mut prx), vec![3]);
        assert!(crx.try_recv().is_ok());
        assert!(crx.try_recv().is_err());
    }
}
