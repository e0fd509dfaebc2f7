//! Search Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A search error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Scoring and tokenizing are pure and cannot fail; the only fallible step of
/// the pipeline is asking a [`CandidateSource`](crate::CandidateSource) for
/// candidates.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The candidate source (usually the catalog store) could not be queried.
    #[display("candidate retrieval failed")]
    Retrieval,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retrieval)
    }
}
