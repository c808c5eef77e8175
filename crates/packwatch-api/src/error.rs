//! Error types for cluster listing operations.

use thiserror::Error;

/// Result type alias for listing operations.
pub type ListResult<T> = Result<T, ListError>;

/// Errors surfaced by a [`crate::Lister`] implementation.
///
/// All variants are transient from the caller's point of view: the
/// metric sync core propagates them unchanged and owns no retry policy.
#[derive(Debug, Error)]
pub enum ListError {
    #[error("cluster api unavailable: {0}")]
    Unavailable(String),

    #[error("listing timed out: {0}")]
    Timeout(String),

    #[error("malformed list response: {0}")]
    Malformed(String),
}
