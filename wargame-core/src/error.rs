//! Error types for the core crate

use thiserror::Error;

/// Errors raised while parsing or configuring a game
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid coordinate '{0}' (expected e.g. 'D2')")]
    InvalidCoord(String),

    #[error("invalid move '{0}' (expected e.g. 'A3 B2')")]
    InvalidMove(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// Fault reported by a remote move source or sink
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Transport hiccup; polling again may succeed
    #[error("move source unavailable: {0}")]
    Unavailable(String),

    /// Payload could not be understood
    #[error("malformed move payload: {0}")]
    Malformed(String),

    /// The source will never produce further moves
    #[error("move source closed")]
    Closed,
}

impl SourceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Unavailable(_) | SourceError::Malformed(_))
    }
}
