//! Error types for the scoring strategies.

use thiserror::Error;

/// Errors raised by the rankers.
///
/// Degenerate input is distinct from an empty *result*: an empty catalog
/// legitimately produces an empty popularity list, but a non-empty corpus
/// that collapses to nothing (no usable tag tokens, no qualifying books,
/// no filtered ratings) must be reported, not silently returned as [].
#[derive(Error, Debug)]
pub enum RankerError {
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },
}

impl RankerError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateInput {
            reason: reason.into(),
        }
    }
}
