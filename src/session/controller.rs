use std::collections::BTreeMap;

use anyhow::Result;
use rand::Rng;
use tracing::{error, info, warn};

use crate::engine::SelectionEngine;
use crate::error::{StudyError, StudyResult};
use crate::pool::{Category, Question, QuestionPool, QuestionSource};
use crate::session::sink::{DisplaySink, ProgressSummary};
use crate::store::{AnswerOutcome, CategoryProgress, ProgressStore};

/// Load state of one category's pool.
#[derive(Clone, Debug)]
pub enum PoolSlot {
    Loading,
    Ready(QuestionPool),
    Unavailable(String),
}

/// The question on screen, held only until it is answered.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingQuestion {
    pub category: Category,
    pub index: usize,
    pub question: Question,
    pub options: Vec<String>,
}

/// Drives a study session: switches categories, asks the selection engine
/// for questions, grades answers through the progress store and reports
/// everything to the display sink. One operation runs at a time.
pub struct SessionController<S: DisplaySink, R: Rng> {
    pools: BTreeMap<Category, PoolSlot>,
    store: ProgressStore,
    engine: SelectionEngine,
    sink: S,
    rng: R,
    current: Category,
    pending: Option<PendingQuestion>,
}

impl<S: DisplaySink, R: Rng> SessionController<S, R> {
    pub fn new(
        store: ProgressStore,
        engine: SelectionEngine,
        sink: S,
        rng: R,
        category: Category,
    ) -> Self {
        Self {
            pools: Category::ALL
                .iter()
                .map(|&c| (c, PoolSlot::Loading))
                .collect(),
            store,
            engine,
            sink,
            rng,
            current: category,
            pending: None,
        }
    }

    /// Record the outcome of loading a category's pool. Pools are immutable
    /// once ready; a second successful load for the same category is ignored.
    pub fn install_pool(&mut self, category: Category, loaded: Result<QuestionPool>) {
        if matches!(self.pools.get(&category), Some(PoolSlot::Ready(_))) {
            warn!(%category, "pool already loaded, ignoring reload");
            return;
        }

        let slot = match loaded {
            Ok(pool) => {
                info!(%category, questions = pool.len(), "question pool loaded");
                PoolSlot::Ready(pool)
            }
            Err(err) => {
                let reason = format!("{err:#}");
                error!(%category, error = %reason, "question pool unavailable");
                if category == self.current {
                    self.sink.render_unavailable(category, &reason);
                }
                PoolSlot::Unavailable(reason)
            }
        };
        self.pools.insert(category, slot);
    }

    /// Load every category from `source` in place.
    pub fn load_pools<Q: QuestionSource + ?Sized>(&mut self, source: &Q) {
        for category in Category::ALL {
            let loaded = QuestionPool::from_source(source, category);
            self.install_pool(category, loaded);
        }
    }

    pub fn pool_slot(&self, category: Category) -> &PoolSlot {
        self.pools.get(&category).unwrap_or(&PoolSlot::Loading)
    }

    pub fn is_ready(&self, category: Category) -> bool {
        matches!(self.pool_slot(category), PoolSlot::Ready(_))
    }

    pub fn current_category(&self) -> Category {
        self.current
    }

    pub fn pending(&self) -> Option<&PendingQuestion> {
        self.pending.as_ref()
    }

    pub fn progress(&self, category: Category) -> &CategoryProgress {
        self.store.get(category)
    }

    pub fn progress_store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn summary(&self, category: Category) -> Option<ProgressSummary> {
        match self.pool_slot(category) {
            PoolSlot::Ready(pool) => Some(ProgressSummary::new(pool, self.store.get(category))),
            _ => None,
        }
    }

    /// Switch to `category` and present its next question. Any unanswered
    /// question from the previous category is dropped.
    pub fn select_category(&mut self, category: Category) -> StudyResult<&PendingQuestion> {
        if category != self.current {
            info!(from = %self.current, to = %category, "switching category");
        }
        self.current = category;
        self.pending = None;
        self.load_next_question()
    }

    pub fn load_next_question(&mut self) -> StudyResult<&PendingQuestion> {
        let category = self.current;
        let pool = match self.pools.get(&category) {
            Some(PoolSlot::Ready(pool)) => pool,
            Some(PoolSlot::Unavailable(reason)) => {
                self.sink.render_unavailable(category, reason);
                return Err(StudyError::SourceUnavailable {
                    category,
                    reason: reason.clone(),
                });
            }
            Some(PoolSlot::Loading) | None => {
                self.sink.render_loading(category);
                return Err(StudyError::PoolLoading { category });
            }
        };

        let progress = self.store.get_mut(category);
        let selection = match self.engine.select(pool, progress, &mut self.rng) {
            Ok(selection) => selection,
            Err(err) => {
                error!(%category, error = %err, "cannot select a question");
                self.sink.render_unavailable(category, &err.to_string());
                return Err(err);
            }
        };
        if selection.change.is_changed() {
            self.store.persist();
        }

        let reference = selection
            .question
            .reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        self.sink
            .render_question(&selection.question.prompt, reference, &selection.options);
        self.sink
            .render_progress_summary(&ProgressSummary::new(pool, self.store.get(category)));

        Ok(&*self.pending.insert(PendingQuestion {
            category,
            index: selection.index,
            question: selection.question,
            options: selection.options,
        }))
    }

    /// Grade `selected` (compared by option text) against the pending question.
    pub fn submit_answer(&mut self, selected: &str) -> StudyResult<AnswerOutcome> {
        let Some(pending) = self.pending.take() else {
            error!("answer submitted with no question awaiting one");
            return Err(StudyError::NoActiveQuestion);
        };
        let category = pending.category;
        let Some(PoolSlot::Ready(pool)) = self.pools.get(&category) else {
            return Err(StudyError::PoolLoading { category });
        };

        let outcome = self.store.record_answer(pool, &pending.question, selected);
        self.sink
            .render_feedback(outcome.is_correct, &outcome.correct_option);
        self.sink
            .render_progress_summary(&ProgressSummary::new(pool, self.store.get(category)));
        Ok(outcome)
    }

    /// Answer with the presented option at `index`.
    pub fn submit_choice(&mut self, index: usize) -> StudyResult<AnswerOutcome> {
        let pending = self.pending.as_ref().ok_or(StudyError::NoActiveQuestion)?;
        let Some(selected) = pending.options.get(index).cloned() else {
            return Err(StudyError::InvalidChoice {
                index,
                available: pending.options.len(),
            });
        };
        self.submit_answer(&selected)
    }

    pub fn reset_category(&mut self, category: Category) {
        self.store.reset(category);
        if self.pending.as_ref().is_some_and(|p| p.category == category) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::QuestionId;
    use crate::pool::test_support::numbered_pool;
    use crate::store::MemoryBackend;
    use anyhow::anyhow;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[derive(Debug, Default)]
    struct RecordingSink {
        questions: Vec<(String, Option<String>, Vec<String>)>,
        feedback: Vec<(bool, String)>,
        summaries: Vec<ProgressSummary>,
        unavailable: Vec<(Category, String)>,
        loading: Vec<Category>,
    }

    impl DisplaySink for RecordingSink {
        fn render_question(&mut self, prompt: &str, reference: Option<&str>, options: &[String]) {
            self.questions.push((
                prompt.to_string(),
                reference.map(str::to_string),
                options.to_vec(),
            ));
        }

        fn render_feedback(&mut self, is_correct: bool, correct_option: &str) {
            self.feedback.push((is_correct, correct_option.to_string()));
        }

        fn render_progress_summary(&mut self, summary: &ProgressSummary) {
            self.summaries.push(*summary);
        }

        fn render_unavailable(&mut self, category: Category, reason: &str) {
            self.unavailable.push((category, reason.to_string()));
        }

        fn render_loading(&mut self, category: Category) {
            self.loading.push(category);
        }
    }

    type TestController = SessionController<RecordingSink, SmallRng>;

    fn controller_with(backend: &MemoryBackend) -> TestController {
        SessionController::new(
            ProgressStore::open(Box::new(backend.clone())),
            SelectionEngine::default(),
            RecordingSink::default(),
            SmallRng::seed_from_u64(42),
            Category::Technician,
        )
    }

    fn ready_controller(pool_len: usize) -> (MemoryBackend, TestController) {
        let backend = MemoryBackend::new();
        let mut controller = controller_with(&backend);
        for category in Category::ALL {
            controller.install_pool(category, Ok(numbered_pool(category, pool_len, 3)));
        }
        (backend, controller)
    }

    #[test]
    fn test_load_while_pool_loading_is_rejected() {
        let backend = MemoryBackend::new();
        let mut controller = controller_with(&backend);
        let err = controller.load_next_question().unwrap_err();
        assert!(matches!(err, StudyError::PoolLoading { .. }));
        assert_eq!(controller.sink().loading, vec![Category::Technician]);
        assert!(controller.pending().is_none());
    }

    #[test]
    fn test_unavailable_pool_blocks_questions() {
        let backend = MemoryBackend::new();
        let mut controller = controller_with(&backend);
        controller.install_pool(Category::Technician, Err(anyhow!("connection refused")));
        assert_eq!(controller.sink().unavailable.len(), 1);

        let err = controller.load_next_question().unwrap_err();
        assert!(matches!(err, StudyError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("connection refused"));
        assert!(controller.sink().questions.is_empty());
    }

    #[test]
    fn test_submit_without_question_is_rejected() {
        let (_backend, mut controller) = ready_controller(5);
        assert!(matches!(
            controller.submit_answer("anything"),
            Err(StudyError::NoActiveQuestion)
        ));
        assert!(matches!(
            controller.submit_choice(0),
            Err(StudyError::NoActiveQuestion)
        ));
    }

    #[test]
    fn test_question_is_rendered_and_answer_graded() {
        let (backend, mut controller) = ready_controller(5);
        let pending = controller.load_next_question().unwrap().clone();
        assert_eq!(pending.options.len(), 1);

        let (prompt, _, options) = controller.sink().questions.last().unwrap().clone();
        assert_eq!(prompt, pending.question.prompt);
        assert_eq!(options, pending.options);

        let outcome = controller.submit_choice(0).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(
            controller.sink().feedback.last(),
            Some(&(true, pending.question.correct_option().unwrap().to_string()))
        );
        let summary = controller.sink().summaries.last().unwrap();
        assert_eq!(summary.correct_count, 1);
        assert_eq!(summary.seen_count, 1);
        assert!(backend.write_count() >= 1);

        // The question was consumed by the answer
        assert!(matches!(
            controller.submit_choice(0),
            Err(StudyError::NoActiveQuestion)
        ));
    }

    #[test]
    fn test_out_of_range_choice_keeps_question_pending() {
        let (_backend, mut controller) = ready_controller(5);
        controller.load_next_question().unwrap();
        assert!(matches!(
            controller.submit_choice(3),
            Err(StudyError::InvalidChoice {
                index: 3,
                available: 1
            })
        ));
        assert!(controller.pending().is_some());
    }

    #[test]
    fn test_select_category_switches_pool() {
        let (_backend, mut controller) = ready_controller(5);
        controller.load_next_question().unwrap();
        let pending = controller.select_category(Category::Extra).unwrap();
        assert_eq!(pending.category, Category::Extra);
        assert_eq!(controller.current_category(), Category::Extra);
    }

    #[test]
    fn test_batch_advance_is_persisted_before_display() {
        let mut saved = crate::store::ProgressData::default();
        let tech = saved.category_mut(Category::Technician);
        tech.correct_count = 8;
        tech.seen_ids = (1..=8).map(QuestionId::Number).collect();
        let backend = MemoryBackend::with_data(saved);

        let mut controller = controller_with(&backend);
        controller.install_pool(
            Category::Technician,
            Ok(numbered_pool(Category::Technician, 12, 3)),
        );
        let pending = controller.load_next_question().unwrap();
        assert!((10..12).contains(&pending.index));

        let persisted = backend.saved().unwrap().category(Category::Technician);
        assert_eq!(persisted.batch_index, 1);
        assert!(persisted.seen_ids.is_empty());
        assert_eq!(persisted.correct_count, 0);
    }

    #[test]
    fn test_second_pass_offers_discrimination() {
        let (_backend, mut controller) = ready_controller(1);
        controller.load_next_question().unwrap();
        let outcome = controller.submit_choice(0).unwrap();
        assert!(outcome.pass_completed);
        assert_eq!(controller.progress(Category::Technician).pass_number, 2);

        let pending = controller.load_next_question().unwrap().clone();
        assert_eq!(pending.options.len(), 2);
        let wrong = pending
            .options
            .iter()
            .position(|o| Some(o.as_str()) != pending.question.correct_option())
            .unwrap();
        let outcome = controller.submit_choice(wrong).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(controller.sink().feedback.last().map(|f| f.0), Some(false));
    }

    #[test]
    fn test_later_pass_distractor_varies_between_loads() {
        let mut saved = crate::store::ProgressData::default();
        saved.category_mut(Category::Technician).pass_number = 2;
        let backend = MemoryBackend::with_data(saved);
        let mut controller = controller_with(&backend);
        controller.install_pool(
            Category::Technician,
            Ok(numbered_pool(Category::Technician, 1, 3)),
        );

        let mut distractors = std::collections::HashSet::new();
        for _ in 0..30 {
            let pending = controller.load_next_question().unwrap();
            assert_eq!(pending.options.len(), 2);
            distractors.extend(
                pending
                    .options
                    .iter()
                    .filter(|o| o.as_str() != "answer 1")
                    .cloned(),
            );
        }
        assert!(distractors.len() > 1, "distractor never changed: {distractors:?}");
    }

    #[test]
    fn test_foreign_seen_ids_are_pruned_and_persisted() {
        let mut saved = crate::store::ProgressData::default();
        let tech = saved.category_mut(Category::Technician);
        tech.seen_ids = (100..=107).map(QuestionId::Number).collect();
        tech.correct_count = 3;
        let backend = MemoryBackend::with_data(saved);

        let mut controller = controller_with(&backend);
        controller.install_pool(
            Category::Technician,
            Ok(numbered_pool(Category::Technician, 5, 3)),
        );
        controller.load_next_question().unwrap();
        assert_eq!(backend.write_count(), 1);
        let persisted = backend.saved().unwrap().category(Category::Technician);
        assert!(persisted.seen_ids.is_empty());
        assert_eq!(persisted.correct_count, 0);

        let outcome = controller.submit_choice(0).unwrap();
        assert!(!outcome.pass_completed);
        assert_eq!(controller.progress(Category::Technician).pass_number, 1);
    }

    #[test]
    fn test_empty_pool_surfaces_configuration_error() {
        let backend = MemoryBackend::new();
        let mut controller = controller_with(&backend);
        controller.install_pool(
            Category::Technician,
            Ok(numbered_pool(Category::Technician, 0, 0)),
        );
        assert!(matches!(
            controller.load_next_question(),
            Err(StudyError::EmptyPoolConfiguration { .. })
        ));
        assert_eq!(controller.sink().unavailable.len(), 1);
    }

    #[test]
    fn test_reset_category_clears_pending_question() {
        let (_backend, mut controller) = ready_controller(5);
        controller.load_next_question().unwrap();
        controller.submit_choice(0).unwrap();
        controller.load_next_question().unwrap();

        controller.reset_category(Category::Technician);
        assert!(controller.pending().is_none());
        assert_eq!(
            controller.progress(Category::Technician),
            &CategoryProgress::default()
        );
    }

    #[test]
    fn test_reinstalling_a_ready_pool_is_ignored() {
        let (_backend, mut controller) = ready_controller(5);
        controller.install_pool(Category::Technician, Err(anyhow!("late failure")));
        assert!(controller.is_ready(Category::Technician));
    }
}
