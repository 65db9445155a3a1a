use std::{ops::Range, time::Duration};

use crate::foundation::error::{ReelError, ReelResult};

/// Scheduling knobs for [`crate::ProgressiveLoader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Frames in the first-paint batch.
    pub initial_batch: u32,
    /// Frames per background batch.
    pub batch_size: u32,
    /// Yield between background batches.
    pub batch_delay: Duration,
    /// Per-frame bound after which a stalled fetch counts as failed.
    pub fetch_timeout: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            initial_batch: 20,
            batch_size: 30,
            batch_delay: Duration::from_millis(50),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl BatchPolicy {
    pub fn validate(&self) -> ReelResult<()> {
        if self.initial_batch == 0 {
            return Err(ReelError::config("initial_batch must be >= 1"));
        }
        if self.batch_size == 0 {
            return Err(ReelError::config("batch_size must be >= 1"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ReelError::config("fetch_timeout must be > 0"));
        }
        Ok(())
    }
}

/// Split `0..frame_count` into the initial batch followed by fixed-size background batches.
///
/// Batches are ascending, contiguous and cover every index exactly once.
pub fn plan_batches(frame_count: u32, policy: &BatchPolicy) -> Vec<Range<u32>> {
    let mut out = Vec::new();
    if frame_count == 0 {
        return out;
    }
    let first_end = policy.initial_batch.max(1).min(frame_count);
    out.push(0..first_end);

    let step = policy.batch_size.max(1);
    let mut start = first_end;
    while start < frame_count {
        let end = start.saturating_add(step).min(frame_count);
        out.push(start..end);
        start = end;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/loader/batch.rs"]
mod tests;
