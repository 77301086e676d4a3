//! Domain models for `ThreadScope`.
//!
//! ## Submodules
//!
//! - [`post`] - Post types (PostId, CanonicalPost, PostMetrics)
//! - [`diagnosis`] - Failure explanation (Diagnosis, FailureCause, ProbeFinding)
//! - [`outcome`] - Extraction outcome
//! - [`thread`] - Reply tree types (ThreadNode, ThreadResult)

mod diagnosis;
mod outcome;
mod post;
mod thread;

// Re-export everything at the models level
pub use diagnosis::{Diagnosis, FailureCause, ProbeFinding, ProbeKind};
pub use outcome::ExtractionOutcome;
pub use post::{CanonicalPost, PostId, PostMetrics, UNKNOWN_AUTHOR};
pub use thread::{ThreadNode, ThreadResult, Walk};

#[cfg(test)]
mod serde_tests;
