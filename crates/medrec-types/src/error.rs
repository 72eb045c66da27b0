use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid health check rating: {0} (expected 0-3)")]
    InvalidRating(u8),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid gender: {0}")]
    InvalidGender(String),
}
