// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ThreadScope` Extract
//!
//! Post extraction on top of an unreliable platform client.
//!
//! The platform serves the same post in three shapes. This crate pairs each
//! retrieval path with the one parser that understands its shape, chains the
//! paths in a fixed order, explains failures, and rebuilds reply threads.
//!
//! | Strategy | Priority | Upstream call | Parser |
//! |----------|----------|---------------|--------|
//! | `post.detail` | 100 | `fetch_post_by_id` | [`normalize::parse_post_object`] |
//! | `post.search` | 80 | `search_posts("id:<id>")` | [`normalize::parse_search_results`] |
//! | `post.raw_protocol` | 60 | `fetch_raw_protocol_response` | [`normalize::parse_raw_protocol`] |
//!
//! ## Modules
//!
//! - [`normalize`] - The three response parsers
//! - [`strategies`] - Strategy implementations and the default pipeline
//! - [`diagnose`] - Probes explaining why a post could not be retrieved
//! - [`thread`] - Depth-bounded reply tree reconstruction
//! - [`extractor`] - The [`PostExtractor`] facade
//! - [`post_url`] - Post URL recognition
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use threadscope_extract::PostExtractor;
//! use threadscope_fetch::BridgeClient;
//!
//! let client = Arc::new(BridgeClient::new("http://localhost:8080/api")?);
//! let extractor = PostExtractor::new(client);
//!
//! let post_id = threadscope_extract::resolve_post_ref("https://x.com/a/status/123")?;
//! let outcome = extractor.extract_post(&post_id).await;
//! let thread = extractor.reconstruct_thread(&post_id, 3).await;
//! ```

pub mod diagnose;
pub mod extractor;
pub mod normalize;
pub mod post_url;
pub mod strategies;
pub mod thread;

#[cfg(test)]
mod parser_edge_tests;

// Re-export key types
pub use diagnose::diagnose;
pub use extractor::PostExtractor;
pub use normalize::{parse_post_object, parse_raw_protocol, parse_search_results};
pub use post_url::{is_supported_url, post_id_from_url, resolve_post_ref};
pub use strategies::{DetailStrategy, RawProtocolStrategy, SearchStrategy, default_pipeline};
pub use thread::{reconstruct_thread, search_threads};
