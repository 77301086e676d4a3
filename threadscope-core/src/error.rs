//! Core error types for `ThreadScope`.

use thiserror::Error;

/// Core error type for `ThreadScope` model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A post identifier was empty or otherwise unusable.
    #[error("Invalid post id: {0:?}")]
    InvalidId(String),

    /// Invalid data in an upstream payload.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
