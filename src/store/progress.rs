use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::pool::{Category, Question, QuestionPool};
use crate::store::ProgressBackend;
use crate::store::schema::{CategoryProgress, ProgressData, SCHEMA_VERSION};

static FRESH: CategoryProgress = CategoryProgress {
    pass_number: 1,
    correct_count: 0,
    seen_ids: BTreeSet::new(),
    batch_index: 0,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub correct_option: String,
    /// The answer finished a full traversal of the pool.
    pub pass_completed: bool,
}

/// Process-wide progress map plus the backend it is mirrored to after every
/// mutation.
pub struct ProgressStore {
    data: ProgressData,
    backend: Box<dyn ProgressBackend>,
}

impl ProgressStore {
    /// Never fails: unreadable, corrupt or outdated saves fall back to fresh
    /// progress for every category.
    pub fn open(backend: Box<dyn ProgressBackend>) -> Self {
        let data = match backend.read() {
            Ok(Some(mut data)) if !data.needs_reset() => {
                data.normalize();
                data
            }
            Ok(Some(data)) => {
                warn!(
                    found = data.schema_version,
                    expected = SCHEMA_VERSION,
                    "saved progress has an unknown schema, starting fresh"
                );
                ProgressData::default()
            }
            Ok(None) => {
                debug!("no saved progress, starting fresh");
                ProgressData::default()
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(error = %reason, "could not read saved progress, starting fresh");
                ProgressData::default()
            }
        };
        Self { data, backend }
    }

    pub fn get(&self, category: Category) -> &CategoryProgress {
        self.data.categories.get(&category).unwrap_or(&FRESH)
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategoryProgress {
        self.data.category_mut(category)
    }

    pub fn data(&self) -> &ProgressData {
        &self.data
    }

    /// Write the whole map. Failures are logged and otherwise ignored; the
    /// in-memory state stays authoritative for the session.
    pub fn persist(&self) {
        if let Err(err) = self.backend.write(&self.data) {
            let reason = format!("{err:#}");
            warn!(error = %reason, "failed to save progress");
        }
    }

    /// Grade `selected` against `question` and fold the result into the
    /// category's progress.
    pub fn record_answer(
        &mut self,
        pool: &QuestionPool,
        question: &Question,
        selected: &str,
    ) -> AnswerOutcome {
        let category = pool.category();
        let is_correct = question.is_correct(selected);

        let progress = self.data.category_mut(category);
        // Only questions of this pool count toward the cycle and the pass
        let dropped = progress.retain_seen(|id| pool.contains_id(id));
        if dropped > 0 {
            info!(%category, dropped, "dropping seen questions missing from the pool");
        }
        progress.seen_ids.insert(question.id.clone());
        if is_correct {
            // Repeats within a cycle can't push the tally past the seen count
            let seen = u32::try_from(progress.seen_count()).unwrap_or(u32::MAX);
            progress.correct_count = (progress.correct_count + 1).min(seen);
        }
        let seen = progress.seen_count();

        self.persist();

        let pass_completed = seen >= pool.len();
        if pass_completed {
            let progress = self.data.category_mut(category);
            progress.complete_pass();
            info!(
                %category,
                pass = progress.pass_number,
                "pass complete, starting over from the first batch"
            );
            self.persist();
        }

        AnswerOutcome {
            is_correct,
            correct_option: question.correct_option().unwrap_or_default().to_string(),
            pass_completed,
        }
    }

    pub fn reset(&mut self, category: Category) {
        *self.data.category_mut(category) = CategoryProgress::default();
        info!(%category, "progress reset");
        self.persist();
    }
}
