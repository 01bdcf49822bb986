//! Fatal request errors. Everything else degrades into a `Notice`.

use thiserror::Error;

use crate::notice::Notice;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("invalid date range: from {from} is after to {to}")]
    InvalidDateRange {
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    },

    #[error("invalid language code '{0}', expected two lowercase letters")]
    InvalidLanguage(String),

    #[error("no content type selected")]
    NoContentSelected,

    /// Every selected content type lacks its API key; no output is produced.
    #[error("missing API credentials for all selected content types")]
    MissingCredentials(Vec<Notice>),
}

impl AnalysisError {
    pub fn notices(&self) -> &[Notice] {
        match self {
            AnalysisError::MissingCredentials(n) => n,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
