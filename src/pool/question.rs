use std::fmt;

use serde::{Deserialize, Serialize};

/// Pool-unique question identifier. Published pools use codes like `T1A01`;
/// hand-made pools often just number their questions.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(u64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{n}"),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for QuestionId {
    fn from(n: u64) -> Self {
        QuestionId::Number(n)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(alias = "question")]
    pub prompt: String,
    #[serde(alias = "answers")]
    pub options: Vec<String>,
    #[serde(alias = "correct")]
    pub correct_index: usize,
    #[serde(default, alias = "refs")]
    pub reference: Option<String>,
}

impl Question {
    /// `None` when `correct_index` is out of range. Pools reject such
    /// records on load, so this only happens for hand-built questions.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }

    /// Authored options other than the correct one, skipping any whose text
    /// duplicates the correct answer.
    pub fn distractors(&self) -> Vec<&str> {
        let Some(correct) = self.correct_option() else {
            return Vec::new();
        };
        self.options
            .iter()
            .enumerate()
            .filter(|(i, opt)| *i != self.correct_index && opt.as_str() != correct)
            .map(|(_, opt)| opt.as_str())
            .collect()
    }

    pub fn is_correct(&self, selected: &str) -> bool {
        self.correct_option() == Some(selected)
    }
}
