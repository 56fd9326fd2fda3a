use std::ops::Range;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::engine::batch::{BatchChange, BatchPolicy, prepare_batch};
use crate::engine::options::build_options;
use crate::error::{StudyError, StudyResult};
use crate::pool::{Question, QuestionPool};
use crate::store::CategoryProgress;

/// The engine's answer to "what next?".
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    /// Stable pool index of the chosen question.
    pub index: usize,
    pub question: Question,
    pub options: Vec<String>,
    pub change: BatchChange,
}

#[derive(Clone, Debug, Default)]
pub struct SelectionEngine {
    policy: BatchPolicy,
}

impl SelectionEngine {
    pub fn new(policy: BatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BatchPolicy {
        &self.policy
    }

    /// Settle the batch window for `progress` (which may advance or wrap it)
    /// and draw the next question from it.
    pub fn select<R: Rng + ?Sized>(
        &self,
        pool: &QuestionPool,
        progress: &mut CategoryProgress,
        rng: &mut R,
    ) -> StudyResult<Selection> {
        let category = pool.category();
        let (change, window) = prepare_batch(pool, progress, &self.policy)?;

        let index = pick_question(pool, progress, window.clone(), rng)
            .ok_or(StudyError::EmptyPoolConfiguration { category })?;
        let question = pool
            .get(index)
            .cloned()
            .ok_or(StudyError::EmptyPoolConfiguration { category })?;
        let options = build_options(&question, progress.pass_number, rng);

        debug!(
            %category,
            id = %question.id,
            index,
            window_start = window.start,
            window_end = window.end,
            options = options.len(),
            "selected question"
        );

        Ok(Selection {
            index,
            question,
            options,
            change,
        })
    }
}

/// Uniform draw from the unseen questions in `window`, or from the whole
/// window once every question in it has been seen this cycle.
pub fn pick_question<R: Rng + ?Sized>(
    pool: &QuestionPool,
    progress: &CategoryProgress,
    window: Range<usize>,
    rng: &mut R,
) -> Option<usize> {
    let questions = pool.questions().get(window.clone())?;
    let unseen: Vec<usize> = window
        .clone()
        .zip(questions)
        .filter(|(_, q)| !progress.seen_ids.contains(&q.id))
        .map(|(i, _)| i)
        .collect();

    if unseen.is_empty() {
        let all: Vec<usize> = window.collect();
        all.choose(rng).copied()
    } else {
        unseen.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::engine::batch::batch_window;
    use crate::pool::test_support::numbered_pool;
    use crate::pool::{Category, QuestionId};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_selection_stays_inside_window() {
        let pool = numbered_pool(Category::Technician, 35, 3);
        let engine = SelectionEngine::default();
        let mut rng = SmallRng::seed_from_u64(7);
        for batch_index in 0..4 {
            let mut progress = CategoryProgress {
                batch_index,
                ..CategoryProgress::default()
            };
            for _ in 0..25 {
                let selection = engine.select(&pool, &mut progress, &mut rng).unwrap();
                assert!(batch_window(pool.len(), batch_index).contains(&selection.index));
            }
        }
    }

    #[test]
    fn test_unseen_questions_come_first() {
        let pool = numbered_pool(Category::Technician, 10, 1);
        let mut progress = CategoryProgress {
            seen_ids: (1..=9).map(QuestionId::Number).collect(),
            ..CategoryProgress::default()
        };
        let mut rng = SmallRng::seed_from_u64(8);
        for _ in 0..20 {
            assert_eq!(pick_question(&pool, &progress, 0..10, &mut rng), Some(9));
        }

        // Everything seen: the whole window is back in play
        progress.seen_ids.insert(QuestionId::Number(10));
        let picks: HashSet<_> = (0..100)
            .filter_map(|_| pick_question(&pool, &progress, 0..10, &mut rng))
            .collect();
        assert!(picks.len() > 1);
        assert!(picks.iter().all(|i| *i < 10));
    }

    #[test]
    fn test_advanced_window_is_used_immediately() {
        let pool = numbered_pool(Category::Technician, 12, 3);
        let engine = SelectionEngine::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let mut progress = CategoryProgress {
            correct_count: 8,
            seen_ids: (1..=8).map(QuestionId::Number).collect(),
            ..CategoryProgress::default()
        };
        let selection = engine.select(&pool, &mut progress, &mut rng).unwrap();
        assert_eq!(selection.change, BatchChange::Advanced { from: 0, to: 1 });
        assert!((10..12).contains(&selection.index));
        assert_eq!(progress.batch_index, 1);
    }

    #[test]
    fn test_options_follow_pass_number() {
        let pool = numbered_pool(Category::General, 4, 3);
        let engine = SelectionEngine::default();
        let mut rng = SmallRng::seed_from_u64(10);

        let mut first_pass = CategoryProgress::default();
        let selection = engine.select(&pool, &mut first_pass, &mut rng).unwrap();
        assert_eq!(selection.options, vec![selection.question.correct_option().unwrap().to_string()]);

        let mut second_pass = CategoryProgress {
            pass_number: 2,
            ..CategoryProgress::default()
        };
        let selection = engine.select(&pool, &mut second_pass, &mut rng).unwrap();
        assert_eq!(selection.options.len(), 2);
    }

    #[test]
    fn test_single_question_pool_terminates() {
        let pool = numbered_pool(Category::Extra, 1, 0);
        let engine = SelectionEngine::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut progress = CategoryProgress {
            pass_number: 3,
            correct_count: 1,
            seen_ids: [QuestionId::Number(1)].into_iter().collect(),
            ..CategoryProgress::default()
        };
        let selection = engine.select(&pool, &mut progress, &mut rng).unwrap();
        assert_eq!(selection.index, 0);
        assert_eq!(selection.change, BatchChange::Wrapped { from: 0 });
        assert_eq!(selection.options.len(), 1);
    }

    #[test]
    fn test_empty_pool_errors_instead_of_spinning() {
        let pool = numbered_pool(Category::Extra, 0, 0);
        let engine = SelectionEngine::default();
        let mut rng = SmallRng::seed_from_u64(12);
        let mut progress = CategoryProgress::default();
        assert!(matches!(
            engine.select(&pool, &mut progress, &mut rng),
            Err(StudyError::EmptyPoolConfiguration { .. })
        ));
    }
}
