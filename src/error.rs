use thiserror::Error;

use crate::pool::Category;

/// Failures the study session reports to its caller. Storage trouble is not
/// here: progress reads and writes degrade to defaults and log instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    #[error("cannot load the {category} question pool: {reason}")]
    SourceUnavailable { category: Category, reason: String },
    #[error("no question is awaiting an answer")]
    NoActiveQuestion,
    #[error("the {category} question pool has no eligible questions")]
    EmptyPoolConfiguration { category: Category },
    #[error("option {index} is not one of the {available} presented options")]
    InvalidChoice { index: usize, available: usize },
    #[error("the {category} question pool is still loading")]
    PoolLoading { category: Category },
}

pub type StudyResult<T> = Result<T, StudyError>;
