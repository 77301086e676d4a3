// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ThreadScope` Core
//!
//! Core types and models for the `ThreadScope` extractor.
//!
//! This crate holds the data shapes every other `ThreadScope` crate agrees on.
//! It performs no I/O. Everything here is built fresh per request and handed
//! back to the caller, nothing is persisted.
//!
//! ## Key Types
//!
//! ### Posts
//! - [`PostId`] - Non-empty, platform-assigned post identifier
//! - [`CanonicalPost`] - The single normalized post shape all parsers target
//! - [`PostMetrics`] - Engagement counters
//!
//! ### Outcomes
//! - [`ExtractionOutcome`] - Success with the winning strategy, or a diagnosis
//! - [`Diagnosis`] - Structured explanation of why extraction failed
//! - [`FailureCause`] - Typed probe result
//!
//! ### Threads
//! - [`ThreadNode`] - A post with its ordered replies
//! - [`ThreadResult`] - Depth-bounded reply tree plus totals

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Posts
    CanonicalPost,
    PostId,
    PostMetrics,
    UNKNOWN_AUTHOR,
    // Diagnosis
    Diagnosis,
    FailureCause,
    ProbeFinding,
    ProbeKind,
    // Outcomes
    ExtractionOutcome,
    // Threads
    ThreadNode,
    ThreadResult,
    Walk,
};
