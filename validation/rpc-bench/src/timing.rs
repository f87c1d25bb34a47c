//! Duration measurement and lap timestamps.

use std::future::Future;
use std::time::{Duration, Instant};

/// Measures the time since it was started.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Consume the timer and return the measured duration.
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}

/// Await `fut` and return its output together with how long it took.
pub async fn timed<F: Future>(fut: F) -> (F::Output, Duration) {
    let timer = Timer::start();
    let output = fut.await;
    (output, timer.stop())
}

/// Append-only sequence of timestamps.
///
/// Created with one timestamp at run start; each milestone appends another.
#[derive(Debug, Clone)]
pub struct LapRecord {
    laps: Vec<Instant>,
}

impl LapRecord {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { laps: vec![start] }
    }

    /// Append the current time.
    pub fn note(&mut self) {
        self.note_at(Instant::now());
    }

    /// Append `at`, clamped so the sequence never goes backwards.
    pub fn note_at(&mut self, at: Instant) {
        let last = self.latest();
        self.laps.push(at.max(last));
    }

    /// Time between the last two laps; zero when only the start exists.
    pub fn last(&self) -> Duration {
        match self.laps.as_slice() {
            [.., prev, last] => last.duration_since(*prev),
            _ => Duration::ZERO,
        }
    }

    /// Time between the first and the last lap.
    pub fn elapsed(&self) -> Duration {
        self.latest().duration_since(self.laps[0])
    }

    /// Number of timestamps, including the start.
    pub fn laps(&self) -> usize {
        self.laps.len()
    }

    fn latest(&self) -> Instant {
        self.laps.last().copied().unwrap_or(self.laps[0])
    }
}

impl Default for LapRecord {
    fn default() -> Self {
        Self::new()
    }
}
