pub mod bundled;
pub mod category;
pub mod question;

use std::collections::HashSet;

use anyhow::{Result, bail};

pub use bundled::BundledSource;
pub use category::Category;
pub use question::{Question, QuestionId};

/// Supplies the raw question records for a category.
pub trait QuestionSource {
    fn load(&self, category: Category) -> Result<Vec<Question>>;

    /// Whether `load` returns records in a stable authored order. Pools from
    /// sources that don't are sorted by id so batch membership survives reloads.
    fn preserves_order(&self) -> bool {
        true
    }
}

/// Immutable, validated question list for one category. A question's pool
/// index is its position here and never changes for the process lifetime.
#[derive(Clone, Debug)]
pub struct QuestionPool {
    category: Category,
    questions: Vec<Question>,
    ids: HashSet<QuestionId>,
}

impl QuestionPool {
    pub fn new(category: Category, mut questions: Vec<Question>, ordered: bool) -> Result<Self> {
        if !ordered {
            questions.sort_by(|a, b| a.id.cmp(&b.id));
        }

        let mut ids = HashSet::with_capacity(questions.len());
        for q in &questions {
            if q.options.is_empty() {
                bail!("question {} in the {category} pool has no options", q.id);
            }
            if q.correct_index >= q.options.len() {
                bail!(
                    "question {} in the {category} pool marks option {} correct but has only {}",
                    q.id,
                    q.correct_index,
                    q.options.len()
                );
            }
            if !ids.insert(q.id.clone()) {
                bail!("duplicate question id {} in the {category} pool", q.id);
            }
        }

        Ok(Self {
            category,
            questions,
            ids,
        })
    }

    pub fn from_source<S: QuestionSource + ?Sized>(source: &S, category: Category) -> Result<Self> {
        let questions = source.load(category)?;
        Self::new(category, questions, source.preserves_order())
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn contains_id(&self, id: &QuestionId) -> bool {
        self.ids.contains(id)
    }
}
