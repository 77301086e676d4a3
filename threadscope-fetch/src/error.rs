//! Fetch error types.

use std::time::Duration;
use thiserror::Error;
use threadscope_core::{Diagnosis, PostId};

// ============================================================================
// Transport Error
// ============================================================================

/// Failure reported by a platform client.
///
/// Transport errors are never fatal to the strategy chain; the chain records
/// them and moves on to the next strategy.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with an unexpected status.
    #[error("Unexpected status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response excerpt or reason.
        message: String,
    },

    /// Rate limited by the upstream.
    #[error("Rate limit reached, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after: Option<u64>,
    },

    /// The session was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// IO error (fixture replay).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport cannot serve this request.
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    /// The configured endpoint is not a usable base URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl TransportError {
    /// Returns true if this error is a rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns true if retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

// ============================================================================
// Fetch Error
// ============================================================================

/// Error type for strategy and extraction operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The platform client failed. Non-fatal to the chain.
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The strategy's response held no recognizable post. Non-fatal.
    #[error("No recognizable post in {strategy} response")]
    NoMatch {
        /// Strategy that produced the response.
        strategy: String,
    },

    /// Every strategy failed; the diagnosis explains why.
    #[error("Post {} not found", .diagnosis.post_id)]
    NotFound {
        /// Diagnosis of the failure.
        diagnosis: Box<Diagnosis>,
    },

    /// One reply node could not be fetched or parsed.
    #[error("Malformed reply under post {post_id}: {reason}")]
    MalformedReply {
        /// Parent post whose replies were being expanded.
        post_id: PostId,
        /// What went wrong.
        reason: String,
    },

    /// All strategies failed.
    #[error("All strategies failed")]
    AllStrategiesFailed,

    /// The pipeline has no strategies.
    #[error("No strategies configured")]
    NoStrategies,

    /// Settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl FetchError {
    /// Creates a no-match error for a strategy.
    pub fn no_match(strategy: impl Into<String>) -> Self {
        Self::NoMatch {
            strategy: strategy.into(),
        }
    }

    /// Returns true if the underlying transport reported a rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_rate_limited())
    }
}

// ============================================================================
// Tests
// ============================================================================
