use std::ops::Range;

use tracing::info;

use crate::error::{StudyError, StudyResult};
use crate::pool::QuestionPool;
use crate::store::CategoryProgress;

/// Questions per batch window.
pub const BATCH_SIZE: usize = 10;

/// Share of correct answers in the current cycle that unlocks the next batch.
pub const ADVANCE_RATIO: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Answers required in a cycle before its accuracy can trigger an
    /// advance. At 1 the ratio alone decides.
    pub min_answers_before_advance: usize,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            min_answers_before_advance: 1,
        }
    }
}

impl BatchPolicy {
    pub fn new(min_answers_before_advance: usize) -> Self {
        Self {
            min_answers_before_advance: min_answers_before_advance.clamp(1, BATCH_SIZE),
        }
    }

    pub fn should_advance(&self, progress: &CategoryProgress) -> bool {
        progress.seen_count() >= self.min_answers_before_advance
            && progress.accuracy() >= ADVANCE_RATIO
    }
}

/// Pool indices covered by `batch_index`, clamped to the pool. Empty once the
/// window starts past the end.
pub fn batch_window(pool_len: usize, batch_index: usize) -> Range<usize> {
    let start = batch_index.saturating_mul(BATCH_SIZE).min(pool_len);
    let end = start.saturating_add(BATCH_SIZE).min(pool_len);
    start..end
}

pub fn batch_count(pool_len: usize) -> usize {
    pool_len.div_ceil(BATCH_SIZE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchChange {
    Unchanged,
    Advanced { from: usize, to: usize },
    /// The window ran off the end of the pool and restarted at batch 0.
    Wrapped { from: usize },
    /// Seen ids absent from the pool were dropped from the cycle.
    Pruned { dropped: usize },
}

impl BatchChange {
    pub fn is_changed(self) -> bool {
        self != BatchChange::Unchanged
    }
}

/// Apply advancement and wrap-around to `progress`, returning what changed and
/// the window to draw from. Callers persist when the change is not `Unchanged`.
pub fn prepare_batch(
    pool: &QuestionPool,
    progress: &mut CategoryProgress,
    policy: &BatchPolicy,
) -> StudyResult<(BatchChange, Range<usize>)> {
    let category = pool.category();
    let original = progress.batch_index;
    let mut change = BatchChange::Unchanged;

    // Saved against another version of the pool
    let dropped = progress.retain_seen(|id| pool.contains_id(id));
    if dropped > 0 {
        change = BatchChange::Pruned { dropped };
        info!(%category, dropped, "dropping seen questions missing from the pool");
    }

    let mut window = batch_window(pool.len(), progress.batch_index);

    if !window.is_empty() && policy.should_advance(progress) {
        let accuracy = progress.accuracy();
        progress.batch_index += 1;
        progress.reset_cycle();
        window = batch_window(pool.len(), progress.batch_index);
        change = BatchChange::Advanced {
            from: original,
            to: progress.batch_index,
        };
        info!(%category, from = original, to = progress.batch_index, accuracy, "advancing batch");
    }

    // Also covers a stale index saved against a larger pool
    if window.is_empty() {
        progress.batch_index = 0;
        progress.reset_cycle();
        window = batch_window(pool.len(), 0);
        change = BatchChange::Wrapped { from: original };
        info!(%category, from = original, "batch window past end of pool, wrapping to first batch");
    }

    if window.is_empty() {
        return Err(StudyError::EmptyPoolConfiguration { category });
    }
    Ok((change, window))
}
