//! Splitting the request total across workers.

use crate::error::{BenchError, BenchResult};

/// Split `total` calls across `workers`.
///
/// Every chunk but the last is `total / workers`; the last absorbs the remainder.
pub fn partition(total: u64, workers: u64) -> BenchResult<Vec<u64>> {
    if workers == 0 {
        return Err(BenchError::InvalidConfig("connections must be > 0".to_string()));
    }
    if workers > total {
        return Err(BenchError::InvalidConfig(format!(
            "connections ({}) must not exceed requests ({})",
            workers, total
        )));
    }

    let base = total / workers;
    let mut chunks = vec![base; workers as usize];
    if let Some(last) = chunks.last_mut() {
        *last = total - base * (workers - 1);
    }
    Ok(chunks)
}
