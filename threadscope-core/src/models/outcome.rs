//! Extraction outcome.

use serde::{Deserialize, Serialize};

use super::diagnosis::Diagnosis;
use super::post::CanonicalPost;

/// The result of extracting a single post.
///
/// Exactly one variant is populated: either the post together with the
/// strategy that produced it, or the diagnosis explaining the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    /// A strategy retrieved and normalized the post.
    Success {
        /// The normalized post.
        post: CanonicalPost,
        /// Id of the strategy that won.
        strategy: String,
    },
    /// Every strategy failed.
    Failure(Diagnosis),
}

impl ExtractionOutcome {
    /// Returns true if the post was retrieved.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the post, if retrieved.
    pub fn post(&self) -> Option<&CanonicalPost> {
        match self {
            Self::Success { post, .. } => Some(post),
            Self::Failure(_) => None,
        }
    }

    /// Returns the winning strategy id, if retrieved.
    pub fn strategy(&self) -> Option<&str> {
        match self {
            Self::Success { strategy, .. } => Some(strategy),
            Self::Failure(_) => None,
        }
    }

    /// Returns the diagnosis, if extraction failed.
    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(diagnosis) => Some(diagnosis),
        }
    }

    /// Consumes the outcome, returning the post or the diagnosis.
    ///
    /// # Errors
    ///
    /// Returns the [`Diagnosis`] when extraction failed.
    pub fn into_result(self) -> Result<(CanonicalPost, String), Diagnosis> {
        match self {
            Self::Success { post, strategy } => Ok((post, strategy)),
            Self::Failure(diagnosis) => Err(diagnosis),
        }
    }
}
