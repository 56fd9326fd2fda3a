use crate::engine::{BATCH_SIZE, batch_count};
use crate::pool::{Category, QuestionPool};
use crate::store::CategoryProgress;

/// Snapshot shown alongside every question and answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressSummary {
    pub category: Category,
    pub correct_count: u32,
    pub seen_count: usize,
    pub pass_number: u32,
    pub batch_index: usize,
    pub batch_count: usize,
    pub pool_len: usize,
}

impl ProgressSummary {
    pub fn new(pool: &QuestionPool, progress: &CategoryProgress) -> Self {
        Self {
            category: pool.category(),
            correct_count: progress.correct_count,
            seen_count: progress.seen_count(),
            pass_number: progress.pass_number,
            batch_index: progress.batch_index,
            batch_count: batch_count(pool.len()),
            pool_len: pool.len(),
        }
    }

    /// Fraction of the pass covered, counting finished batches as whole.
    pub fn pass_progress(&self) -> f64 {
        if self.pool_len == 0 {
            return 0.0;
        }
        let covered = (self.batch_index * BATCH_SIZE + self.seen_count)
            .min(self.pool_len);
        covered as f64 / self.pool_len as f64
    }
}

/// Whatever presents the session to the learner.
pub trait DisplaySink {
    fn render_question(&mut self, prompt: &str, reference: Option<&str>, options: &[String]);

    fn render_feedback(&mut self, is_correct: bool, correct_option: &str);

    fn render_progress_summary(&mut self, summary: &ProgressSummary);

    /// Blocking "cannot load content" state for a category.
    fn render_unavailable(&mut self, category: Category, reason: &str);

    fn render_loading(&mut self, category: Category);
}
