use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pool::{Category, QuestionId};

pub const SCHEMA_VERSION: u32 = 1;

fn default_pass_number() -> u32 {
    1
}

/// Learner state for one category. `seen_ids` and `correct_count` describe
/// the current batch/pass cycle and always reset together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    #[serde(default = "default_pass_number", alias = "pass")]
    pub pass_number: u32,
    #[serde(default, alias = "correct")]
    pub correct_count: u32,
    #[serde(default, alias = "seen")]
    pub seen_ids: BTreeSet<QuestionId>,
    #[serde(default, alias = "batch")]
    pub batch_index: usize,
}

impl Default for CategoryProgress {
    fn default() -> Self {
        Self {
            pass_number: default_pass_number(),
            correct_count: 0,
            seen_ids: BTreeSet::new(),
            batch_index: 0,
        }
    }
}

impl CategoryProgress {
    pub fn seen_count(&self) -> usize {
        self.seen_ids.len()
    }

    /// Correct answers over answered questions in the current cycle. An empty
    /// cycle counts as one answered question so the ratio starts at zero.
    pub fn accuracy(&self) -> f64 {
        self.correct_count as f64 / self.seen_count().max(1) as f64
    }

    pub fn reset_cycle(&mut self) {
        self.seen_ids.clear();
        self.correct_count = 0;
    }

    pub fn complete_pass(&mut self) {
        self.pass_number += 1;
        self.reset_cycle();
        self.batch_index = 0;
    }

    /// Drop seen ids `keep` rejects, re-clamping the correct tally. Returns
    /// how many ids were dropped.
    pub fn retain_seen(&mut self, keep: impl Fn(&QuestionId) -> bool) -> usize {
        let before = self.seen_ids.len();
        self.seen_ids.retain(|id| keep(id));
        self.normalize();
        before - self.seen_ids.len()
    }

    /// Repair values a hand-edited or foreign progress file can carry.
    pub fn normalize(&mut self) {
        self.pass_number = self.pass_number.max(1);
        let seen = u32::try_from(self.seen_count()).unwrap_or(u32::MAX);
        self.correct_count = self.correct_count.min(seen);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub categories: BTreeMap<Category, CategoryProgress>,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            categories: Category::ALL
                .iter()
                .map(|&c| (c, CategoryProgress::default()))
                .collect(),
        }
    }
}

impl ProgressData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    /// Fill in categories missing from older files and repair each entry.
    pub fn normalize(&mut self) {
        for category in Category::ALL {
            self.categories.entry(category).or_default().normalize();
        }
    }

    pub fn category(&self, category: Category) -> CategoryProgress {
        self.categories.get(&category).cloned().unwrap_or_default()
    }

    pub fn category_mut(&mut self, category: Category) -> &mut CategoryProgress {
        self.categories.entry(category).or_default()
    }
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub hamprep_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub progress: ProgressData,
}
