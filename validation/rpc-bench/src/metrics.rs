//! Per-worker tallies, latency histograms and the final run summary.

use std::time::Duration;

use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

/// Records call latencies in microseconds.
#[derive(Debug, Clone)]
pub struct LatencyRecorder {
    histogram: Histogram<u64>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self {
            histogram: Histogram::new(3).expect("3 significant figures is a valid precision"),
        }
    }

    pub fn record(&mut self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(micros.max(1));
    }

    /// Fold another worker's samples into this one.
    pub fn merge(&mut self, other: &LatencyRecorder) {
        self.histogram.add(&other.histogram).ok();
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    pub fn stats(&self) -> LatencyStats {
        if self.histogram.is_empty() {
            return LatencyStats::default();
        }

        LatencyStats {
            samples: self.histogram.len(),
            p50_ms: self.histogram.value_at_percentile(50.0) as f64 / 1000.0,
            p90_ms: self.histogram.value_at_percentile(90.0) as f64 / 1000.0,
            p99_ms: self.histogram.value_at_percentile(99.0) as f64 / 1000.0,
            min_ms: self.histogram.min() as f64 / 1000.0,
            max_ms: self.histogram.max() as f64 / 1000.0,
            avg_ms: self.histogram.mean() / 1000.0,
        }
    }
}

impl Default for LatencyRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency percentiles in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub samples: u64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
}

/// Final tally sent by each worker exactly once.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub worker: usize,
    pub chunk_size: u64,
    pub success: u64,
    pub failure: u64,
    pub latency: LatencyRecorder,
}

impl CompletionReport {
    /// `success + failure == chunk_size`.
    pub fn is_balanced(&self) -> bool {
        self.success + self.failure == self.chunk_size
    }
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub scenario: String,
    pub target: String,
    pub requests: u64,
    pub connections: u64,
    pub successful: u64,
    pub failed: u64,
    pub elapsed_secs: f64,
    pub requests_per_second: f64,
    pub latency: LatencyStats,
    /// Set when the run was interrupted before every call was attempted.
    pub cancelled: bool,
}

impl RunSummary {
    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            (self.successful as f64 / self.requests as f64) * 100.0
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Throughput over `elapsed`, zero for an empty interval.
pub fn requests_per_second(requests: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        requests as f64 / secs
    } else {
        0.0
    }
}
