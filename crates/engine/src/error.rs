//! Error taxonomy for the recommendation facade.
//!
//! Lower layers never swallow errors and the facade passes them through
//! untouched; translating them into user-visible messages is the
//! presentation layer's job.

use catalog::LoadError;
use rankers::RankerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    /// A required source is missing or malformed. Fatal at startup: the
    /// process must not serve recommendations over a partial catalog.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The requested title has no exact match in the catalog
    #[error("no book titled {title:?} in the catalog")]
    NotFound { title: String },

    /// The computation's input collapsed to nothing (empty tag corpus,
    /// no qualifying books, empty filtered rating set)
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },
}

impl From<RankerError> for RecommendError {
    fn from(err: RankerError) -> Self {
        match err {
            RankerError::DegenerateInput { reason } => Self::DegenerateInput { reason },
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecommendError>;
